//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! 인증/인가 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.
//! 레코더가 설치되지 않은 경우(테스트 등) 기록은 무시됩니다.

use metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Prometheus 메트릭 레코더를 설정하고 핸들을 반환합니다.
///
/// 레코더가 이미 설치되어 있으면 에러를 반환합니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

// ============================================================================
// 인증 메트릭 헬퍼 함수
// ============================================================================

/// 로그인 시도 결과 (`success`, `invalid_credentials`).
pub fn record_login_attempt(outcome: &'static str) {
    counter!("auth_login_attempts_total", "outcome" => outcome).increment(1);
}

/// 가드 거부 (`access`, `refresh`).
pub fn record_guard_rejection(guard: &'static str) {
    counter!("auth_guard_rejections_total", "guard" => guard).increment(1);
}

/// 역할 가드 거부.
pub fn record_role_denial(route: &str) {
    counter!("auth_role_denials_total", "route" => route.to_string()).increment(1);
}

/// 사용자 생성.
pub fn record_user_registered() {
    counter!("users_registered_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_without_recorder_are_noops() {
        record_login_attempt("success");
        record_guard_rejection("access");
        record_role_denial("/users/{id}");
        record_user_registered();
    }
}
