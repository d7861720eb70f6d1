use todo_core::HealthReport;

/// Liveness check. Answers without touching storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthService;

impl HealthService {
    pub fn status(&self) -> HealthReport {
        HealthReport::ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_ok() {
        assert_eq!(HealthService.status().status, "OK");
    }
}
