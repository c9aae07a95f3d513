// hospital-gateway/src/discovery.rs
// ============================================================================
// Module: Service Discovery & Routing
// Description: Path-prefix to service mapping, and a registry of instance
// base URLs per service with a selectable load-balance strategy.
// Dependencies: dashmap
// ============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;

/// The fixed path-prefix routing table. First matching prefix wins; there
/// is no overlap between entries so order does not matter in practice.
const ROUTES: &[(&str, &str)] = &[
    ("/api/auth/", "auth-service"),
    ("/api/patients/", "patient-service"),
    ("/api/doctors/", "doctor-service"),
    ("/api/appointments/", "appointment-service"),
    ("/api/medical-records/", "medical-records-service"),
    ("/api/facilities/", "facility-service"),
    ("/api/notifications/", "notification-service"),
    ("/api/audit/", "audit-service"),
];

/// Resolves a request path to the downstream service name, if any prefix
/// matches.
#[must_use]
pub fn service_for_path(path: &str) -> Option<&'static str> {
    ROUTES
        .iter()
        .find(|(prefix, _)| path.starts_with(prefix))
        .map(|(_, service)| *service)
}

/// Paths the gateway never authenticates or rate-limits.
const PUBLIC_PATHS: &[&str] = &[
    "/api/auth/login",
    "/api/auth/register",
    "/api/auth/refresh",
    "/q/health/live",
    "/q/health/ready",
    "/q/health",
    "/q/metrics",
    "/q/openapi",
    "/",
];

/// True when `path` bypasses authentication and rate limiting. `/swagger-ui`
/// is matched by prefix since it serves a directory of static assets.
#[must_use]
pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path) || path.starts_with("/swagger-ui/")
}

/// How a registered service's instances are picked across repeated calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadBalanceStrategy {
    #[default]
    RoundRobin,
    Random,
    LeastRequests,
}

#[derive(Debug, Default)]
struct ServiceInstances {
    base_urls: Vec<String>,
    next_index: AtomicUsize,
    in_flight: Vec<AtomicUsize>,
}

/// Registry of downstream base URLs per service name. Instances are
/// registered statically at startup (from configuration) in this
/// implementation; a production deployment could instead wire this to a
/// control-plane watch without changing the trait.
pub trait ServiceRegistry: Send + Sync {
    /// Picks one healthy instance base URL for `service`, per `strategy`.
    fn pick(&self, service: &str, strategy: LoadBalanceStrategy) -> Option<String>;

    /// Registers (or replaces) the instance list for `service`.
    fn register(&self, service: &str, base_urls: Vec<String>);

    /// Returns true if `service` has at least one registered instance.
    fn is_known(&self, service: &str) -> bool;
}

/// `DashMap`-backed [`ServiceRegistry`].
#[derive(Debug, Default)]
pub struct DashMapServiceRegistry {
    services: DashMap<String, ServiceInstances>,
}

impl DashMapServiceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ServiceRegistry for DashMapServiceRegistry {
    fn pick(&self, service: &str, strategy: LoadBalanceStrategy) -> Option<String> {
        let instances = self.services.get(service)?;
        if instances.base_urls.is_empty() {
            return None;
        }
        let index = match strategy {
            LoadBalanceStrategy::RoundRobin => instances.next_index.fetch_add(1, Ordering::Relaxed) % instances.base_urls.len(),
            LoadBalanceStrategy::Random => {
                // Avoids pulling in `rand` for a single call site: the low
                // bits of a monotonic counter are as good as any for
                // spreading load across a handful of instances.
                instances.next_index.fetch_add(1, Ordering::Relaxed).wrapping_mul(2_654_435_761) % instances.base_urls.len()
            }
            LoadBalanceStrategy::LeastRequests => instances
                .in_flight
                .iter()
                .enumerate()
                .min_by_key(|(_, count)| count.load(Ordering::Relaxed))
                .map_or(0, |(index, _)| index),
        };
        instances.base_urls.get(index).cloned()
    }

    fn register(&self, service: &str, base_urls: Vec<String>) {
        let in_flight = base_urls.iter().map(|_| AtomicUsize::new(0)).collect();
        self.services.insert(service.to_string(), ServiceInstances { base_urls, next_index: AtomicUsize::new(0), in_flight });
    }

    fn is_known(&self, service: &str) -> bool {
        self.services.get(service).is_some_and(|instances| !instances.base_urls.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_paths_by_longest_matching_prefix_table_entry() {
        assert_eq!(service_for_path("/api/patients/123"), Some("patient-service"));
        assert_eq!(service_for_path("/api/appointments/"), Some("appointment-service"));
        assert_eq!(service_for_path("/unknown"), None);
    }

    #[test]
    fn login_and_register_are_public_but_other_auth_paths_are_not() {
        assert!(is_public_path("/api/auth/login"));
        assert!(is_public_path("/api/auth/register"));
        assert!(!is_public_path("/api/auth/me"));
    }

    #[test]
    fn round_robin_cycles_through_registered_instances() {
        let registry = DashMapServiceRegistry::new();
        registry.register("patient-service", vec!["http://a".to_string(), "http://b".to_string()]);
        let first = registry.pick("patient-service", LoadBalanceStrategy::RoundRobin).unwrap();
        let second = registry.pick("patient-service", LoadBalanceStrategy::RoundRobin).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn unknown_service_has_no_instance() {
        let registry = DashMapServiceRegistry::new();
        assert!(registry.pick("ghost-service", LoadBalanceStrategy::RoundRobin).is_none());
        assert!(!registry.is_known("ghost-service"));
    }
}
