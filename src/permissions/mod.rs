pub mod gate;

pub use gate::{
    PermissionGate, PermissionResult, PermissionStatus, PermissionSystem, PermissionTransition,
};
