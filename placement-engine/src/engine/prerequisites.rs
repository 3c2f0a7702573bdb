use crate::error::EngineError;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraAuthorization {
    Granted,
    Denied,
    /// Blocked by device policy; the user cannot grant it.
    Restricted,
    NotDetermined,
}

/// Device capabilities the engine needs before a session can run.
pub trait CapabilityProbe {
    fn world_tracking_supported(&self) -> bool;

    fn face_tracking_supported(&self) -> bool;

    fn camera_authorization(&self) -> CameraAuthorization;

    /// Ask the user for camera access. Only called while `NotDetermined`.
    fn request_camera_access(&mut self) -> bool;
}

/// Single upfront answer to "can the engine run here".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prerequisites {
    Ready,
    Unsupported,
    PermissionDenied,
}

impl Prerequisites {
    pub fn into_result(self) -> Result<(), EngineError> {
        match self {
            Self::Ready => Ok(()),
            Self::Unsupported => Err(EngineError::Unsupported),
            Self::PermissionDenied => Err(EngineError::PermissionDenied),
        }
    }
}

pub fn check_prerequisites<P: CapabilityProbe + ?Sized>(probe: &mut P, needs_face_tracking: bool) -> Prerequisites {
    let supported = if needs_face_tracking {
        probe.face_tracking_supported()
    } else {
        probe.world_tracking_supported()
    };
    if !supported {
        warn!("Tracking not supported on this device");
        return Prerequisites::Unsupported;
    }

    let granted = match probe.camera_authorization() {
        CameraAuthorization::Granted => true,
        CameraAuthorization::NotDetermined => probe.request_camera_access(),
        CameraAuthorization::Denied | CameraAuthorization::Restricted => false,
    };
    if !granted {
        warn!("Camera access denied");
        return Prerequisites::PermissionDenied;
    }
    Prerequisites::Ready
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Device {
        world: bool,
        face: bool,
        camera: CameraAuthorization,
        grants_on_request: bool,
        requests: u32,
    }

    impl Device {
        fn capable() -> Self {
            Self {
                world: true,
                face: true,
                camera: CameraAuthorization::Granted,
                grants_on_request: true,
                requests: 0,
            }
        }
    }

    impl CapabilityProbe for Device {
        fn world_tracking_supported(&self) -> bool {
            self.world
        }

        fn face_tracking_supported(&self) -> bool {
            self.face
        }

        fn camera_authorization(&self) -> CameraAuthorization {
            self.camera
        }

        fn request_camera_access(&mut self) -> bool {
            self.requests += 1;
            self.grants_on_request
        }
    }

    #[test]
    fn capable_device_is_ready() {
        assert_eq!(check_prerequisites(&mut Device::capable(), false), Prerequisites::Ready);
        assert!(Prerequisites::Ready.into_result().is_ok());
    }

    #[test]
    fn missing_face_tracking_only_matters_when_needed() {
        let mut device = Device {
            face: false,
            ..Device::capable()
        };
        assert_eq!(check_prerequisites(&mut device, false), Prerequisites::Ready);
        assert_eq!(check_prerequisites(&mut device, true), Prerequisites::Unsupported);
    }

    #[test]
    fn undetermined_permission_is_requested_once() {
        let mut device = Device {
            camera: CameraAuthorization::NotDetermined,
            grants_on_request: false,
            ..Device::capable()
        };
        assert_eq!(check_prerequisites(&mut device, false), Prerequisites::PermissionDenied);
        assert_eq!(device.requests, 1);
        assert!(matches!(
            Prerequisites::PermissionDenied.into_result(),
            Err(EngineError::PermissionDenied)
        ));
    }

    #[test]
    fn restricted_camera_is_never_requested() {
        let mut device = Device {
            camera: CameraAuthorization::Restricted,
            ..Device::capable()
        };
        assert_eq!(check_prerequisites(&mut device, false), Prerequisites::PermissionDenied);
        assert_eq!(device.requests, 0);
    }
}
