use crate::{
    prelude::{HashMap, HashSet},
    MapError,
};
use serde::{Deserialize, Serialize};

/// Lifecycle of one runtime permission within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionStatus {
    Unknown,
    Requested,
    Granted,
    Denied,
}

impl PermissionStatus {
    /// Allowed moves: forward only, plus `Denied -> Requested` on retry.
    /// `Granted` is terminal.
    pub fn can_transition_to(self, next: PermissionStatus) -> bool {
        use PermissionStatus::*;
        matches!(
            (self, next),
            (Unknown, Requested)
                | (Unknown, Granted)
                | (Requested, Granted)
                | (Requested, Denied)
                | (Denied, Requested)
        )
    }
}

impl std::fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PermissionStatus::Unknown => "unknown",
            PermissionStatus::Requested => "requested",
            PermissionStatus::Granted => "granted",
            PermissionStatus::Denied => "denied",
        };
        f.write_str(name)
    }
}

/// One entry of the OS result vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionResult {
    Granted,
    Denied,
}

impl From<bool> for PermissionResult {
    fn from(granted: bool) -> Self {
        if granted {
            PermissionResult::Granted
        } else {
            PermissionResult::Denied
        }
    }
}

/// External OS permission service
pub trait PermissionSystem {
    /// Whether the OS already grants `permission`
    fn check(&self, permission: &str) -> bool;

    /// Issue one batched request. Results arrive later through
    /// `PermissionGate::on_permission_result`.
    fn request(&mut self, permissions: &[String]);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionTransition {
    pub permission: String,
    pub from: PermissionStatus,
    pub to: PermissionStatus,
    /// The permission unlocks the current-location overlay
    pub location_class: bool,
}

impl PermissionTransition {
    pub fn grants_location(&self) -> bool {
        self.location_class && self.to == PermissionStatus::Granted
    }
}

/// Tracks runtime permission status and decides which transitions happen.
///
/// The gate does not own any overlay. Callers apply the returned transitions,
/// activating the location overlay when [`PermissionTransition::grants_location`].
#[derive(Debug, Default)]
pub struct PermissionGate {
    states: HashMap<String, PermissionStatus>,
    /// Ids treated as location-class besides the `*LOCATION` naming rule
    location_permissions: HashSet<String>,
}

impl PermissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an extra id as location-class
    pub fn with_location_permission(mut self, permission: impl Into<String>) -> Self {
        self.location_permissions.insert(permission.into());
        self
    }

    pub fn current_status(&self, permission: &str) -> PermissionStatus {
        self.states
            .get(permission)
            .copied()
            .unwrap_or(PermissionStatus::Unknown)
    }

    /// `LOCATION`, `android.permission.ACCESS_FINE_LOCATION`, ...
    pub fn is_location_class(&self, permission: &str) -> bool {
        permission.to_ascii_uppercase().ends_with("LOCATION")
            || self.location_permissions.contains(permission)
    }

    /// Requests every id in `permissions` that is not yet granted.
    ///
    /// Ids the OS already grants become `Granted` immediately. The rest move to
    /// `Requested` and go out in a single batched request; this returns before
    /// any result is known.
    pub fn request_missing<S: AsRef<str>>(
        &mut self,
        permissions: &[S],
        system: &mut dyn PermissionSystem,
    ) -> Vec<PermissionTransition> {
        let mut transitions = Vec::new();
        let mut batch: Vec<String> = Vec::new();

        for permission in permissions.iter().map(AsRef::as_ref) {
            if batch.iter().any(|p| p == permission)
                || self.current_status(permission) == PermissionStatus::Granted
            {
                continue;
            }

            if system.check(permission) {
                // A denied id granted from system settings re-enters through `Requested`
                if self.current_status(permission) == PermissionStatus::Denied {
                    transitions.extend(self.transition(permission, PermissionStatus::Requested));
                }
                transitions.extend(self.transition(permission, PermissionStatus::Granted));
                continue;
            }

            // Re-requesting an id already in flight leaves it `Requested`
            transitions.extend(self.transition(permission, PermissionStatus::Requested));
            batch.push(permission.to_string());
        }

        if !batch.is_empty() {
            log::info!("requesting permissions {:?}", batch);
            system.request(&batch);
        }
        transitions
    }

    /// Applies the OS result vector of a batched request.
    ///
    /// Results pair with `permissions` by position. A vector shorter than the
    /// id list only resolves the ids it covers; the rest stay `Requested`.
    pub fn on_permission_result<S: AsRef<str>>(
        &mut self,
        permissions: &[S],
        results: &[PermissionResult],
    ) -> Vec<PermissionTransition> {
        if results.len() < permissions.len() {
            log::warn!(
                "{}",
                MapError::PermissionResultMismatch {
                    requested: permissions.len(),
                    received: results.len(),
                }
            );
        }

        let mut transitions = Vec::new();
        for (permission, result) in permissions.iter().map(AsRef::as_ref).zip(results) {
            let status = self.current_status(permission);
            if status != PermissionStatus::Requested {
                log::debug!(
                    "ignoring {:?} result for {} in state {}",
                    result,
                    permission,
                    status
                );
                continue;
            }
            let next = match result {
                PermissionResult::Granted => PermissionStatus::Granted,
                PermissionResult::Denied => PermissionStatus::Denied,
            };
            transitions.extend(self.transition(permission, next));
        }
        transitions
    }

    /// Whether any location-class id has been granted
    pub fn location_granted(&self) -> bool {
        self.states.iter().any(|(id, status)| {
            *status == PermissionStatus::Granted && self.is_location_class(id)
        })
    }

    /// Ids still waiting for a result
    pub fn pending(&self) -> Vec<&str> {
        let mut pending: Vec<&str> = self
            .states
            .iter()
            .filter(|(_, status)| **status == PermissionStatus::Requested)
            .map(|(id, _)| id.as_str())
            .collect();
        pending.sort_unstable();
        pending
    }

    fn transition(
        &mut self,
        permission: &str,
        next: PermissionStatus,
    ) -> Option<PermissionTransition> {
        let current = self.current_status(permission);
        if current == next || !current.can_transition_to(next) {
            return None;
        }

        self.states.insert(permission.to_string(), next);
        log::info!("permission {}: {} -> {}", permission, current, next);
        Some(PermissionTransition {
            permission: permission.to_string(),
            from: current,
            to: next,
            location_class: self.is_location_class(permission),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeSystem {
        already_granted: Vec<String>,
        requests: Vec<Vec<String>>,
    }

    impl PermissionSystem for FakeSystem {
        fn check(&self, permission: &str) -> bool {
            self.already_granted.iter().any(|p| p == permission)
        }

        fn request(&mut self, permissions: &[String]) {
            self.requests.push(permissions.to_vec());
        }
    }

    #[test]
    fn test_transition_table() {
        use PermissionStatus::*;
        assert!(Unknown.can_transition_to(Requested));
        assert!(Requested.can_transition_to(Denied));
        assert!(Denied.can_transition_to(Requested));
        assert!(!Granted.can_transition_to(Requested));
        assert!(!Granted.can_transition_to(Denied));
        assert!(!Denied.can_transition_to(Granted));
        assert!(!Requested.can_transition_to(Unknown));
    }

    #[test]
    fn test_request_missing_batches_once() {
        let mut gate = PermissionGate::new();
        let mut system = FakeSystem::default();

        let transitions =
            gate.request_missing(&["LOCATION", "WRITE_EXTERNAL_STORAGE", "LOCATION"], &mut system);

        assert_eq!(transitions.len(), 2);
        assert_eq!(
            system.requests,
            vec![vec!["LOCATION".to_string(), "WRITE_EXTERNAL_STORAGE".to_string()]]
        );
        assert_eq!(gate.current_status("LOCATION"), PermissionStatus::Requested);
        assert_eq!(gate.pending(), vec!["LOCATION", "WRITE_EXTERNAL_STORAGE"]);
    }

    #[test]
    fn test_os_pre_granted_skips_request() {
        let mut gate = PermissionGate::new();
        let mut system = FakeSystem {
            already_granted: vec!["LOCATION".into()],
            ..Default::default()
        };

        let transitions = gate.request_missing(&["LOCATION"], &mut system);
        assert!(system.requests.is_empty());
        assert_eq!(transitions.len(), 1);
        assert!(transitions[0].grants_location());
        assert_eq!(gate.current_status("LOCATION"), PermissionStatus::Granted);
    }

    #[test]
    fn test_grant_result_for_location() {
        let mut gate = PermissionGate::new();
        let mut system = FakeSystem::default();
        gate.request_missing(&["LOCATION"], &mut system);

        let transitions = gate.on_permission_result(&["LOCATION"], &[PermissionResult::Granted]);
        assert_eq!(gate.current_status("LOCATION"), PermissionStatus::Granted);
        assert_eq!(
            transitions,
            vec![PermissionTransition {
                permission: "LOCATION".into(),
                from: PermissionStatus::Requested,
                to: PermissionStatus::Granted,
                location_class: true,
            }]
        );
    }

    #[test]
    fn test_short_result_vector_leaves_rest_requested() {
        let mut gate = PermissionGate::new();
        let mut system = FakeSystem::default();
        gate.request_missing(&["LOCATION", "WRITE_EXTERNAL_STORAGE"], &mut system);

        gate.on_permission_result(
            &["LOCATION", "WRITE_EXTERNAL_STORAGE"],
            &[PermissionResult::Denied],
        );
        assert_eq!(gate.current_status("LOCATION"), PermissionStatus::Denied);
        assert_eq!(
            gate.current_status("WRITE_EXTERNAL_STORAGE"),
            PermissionStatus::Requested
        );
    }

    #[test]
    fn test_denied_can_be_retried_granted_is_terminal() {
        let mut gate = PermissionGate::new();
        let mut system = FakeSystem::default();
        gate.request_missing(&["CAMERA", "LOCATION"], &mut system);
        gate.on_permission_result(
            &["CAMERA", "LOCATION"],
            &[PermissionResult::Denied, PermissionResult::Granted],
        );

        let retry = gate.request_missing(&["CAMERA", "LOCATION"], &mut system);
        assert_eq!(retry.len(), 1);
        assert_eq!(retry[0].from, PermissionStatus::Denied);
        assert_eq!(retry[0].to, PermissionStatus::Requested);
        assert_eq!(system.requests.last().unwrap(), &vec!["CAMERA".to_string()]);

        // Late duplicate result cannot move a granted id
        gate.on_permission_result(&["LOCATION"], &[PermissionResult::Denied]);
        assert_eq!(gate.current_status("LOCATION"), PermissionStatus::Granted);
    }

    #[test]
    fn test_denied_then_granted_in_settings_goes_through_requested() {
        let mut gate = PermissionGate::new();
        let mut system = FakeSystem::default();
        gate.request_missing(&["LOCATION"], &mut system);
        gate.on_permission_result(&["LOCATION"], &[PermissionResult::Denied]);
        assert!(!gate.location_granted());

        system.already_granted.push("LOCATION".into());
        let retry = gate.request_missing(&["LOCATION"], &mut system);

        let steps: Vec<_> = retry.iter().map(|t| (t.from, t.to)).collect();
        assert_eq!(
            steps,
            vec![
                (PermissionStatus::Denied, PermissionStatus::Requested),
                (PermissionStatus::Requested, PermissionStatus::Granted),
            ]
        );
        assert!(retry[1].grants_location());
        assert_eq!(gate.current_status("LOCATION"), PermissionStatus::Granted);
        assert!(gate.location_granted());
        assert_eq!(system.requests.len(), 1);
    }

    #[test]
    fn test_result_for_unrequested_id_is_ignored() {
        let mut gate = PermissionGate::new();
        let transitions = gate.on_permission_result(&["LOCATION"], &[PermissionResult::Granted]);
        assert!(transitions.is_empty());
        assert_eq!(gate.current_status("LOCATION"), PermissionStatus::Unknown);
    }

    #[test]
    fn test_location_classification() {
        let gate = PermissionGate::new().with_location_permission("GPS");
        assert!(gate.is_location_class("LOCATION"));
        assert!(gate.is_location_class("android.permission.ACCESS_FINE_LOCATION"));
        assert!(gate.is_location_class("GPS"));
        assert!(!gate.is_location_class("WRITE_EXTERNAL_STORAGE"));
    }
}
