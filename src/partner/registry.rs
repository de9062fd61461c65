use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, LazyLock, OnceLock};

use regex::Regex;
use tracing::{debug, error};

use super::backend::PartnerBackend;
use super::error::PartnerError;

static PARTNER_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("파트너 코드 정규식"));

/// `abstract` 로 시작하는 코드는 예약되어 목록에 노출하지 않는다.
const RESERVED_PREFIX: &str = "abstract";

pub type BackendFactory = Box<dyn Fn() -> Arc<dyn PartnerBackend> + Send + Sync>;

struct Registration {
    factory: BackendFactory,
    instance: OnceLock<Arc<dyn PartnerBackend>>,
}

impl Registration {
    fn new(factory: BackendFactory) -> Self {
        Self {
            factory,
            instance: OnceLock::new(),
        }
    }

    fn get(&self) -> Arc<dyn PartnerBackend> {
        self.instance.get_or_init(|| (self.factory)()).clone()
    }
}

/// 파트너 코드별 백엔드 팩토리 맵.
///
/// 기본 제공(builtin) 백엔드와 배포 환경별(local) 백엔드 두 계층을 가지며,
/// 같은 코드가 양쪽에 있으면 local 이 우선한다. 인스턴스는 코드당 한 번만 생성된다.
#[derive(Default)]
pub struct PartnerRegistry {
    builtin: BTreeMap<String, Registration>,
    local: BTreeMap<String, Registration>,
}

impl PartnerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_builtin<F>(&mut self, code: &str, factory: F) -> Result<(), PartnerError>
    where
        F: Fn() -> Arc<dyn PartnerBackend> + Send + Sync + 'static,
    {
        validate_code(code)?;
        self.builtin.insert(code.to_string(), Registration::new(Box::new(factory)));
        Ok(())
    }

    pub fn register_local<F>(&mut self, code: &str, factory: F) -> Result<(), PartnerError>
    where
        F: Fn() -> Arc<dyn PartnerBackend> + Send + Sync + 'static,
    {
        validate_code(code)?;
        self.local.insert(code.to_string(), Registration::new(Box::new(factory)));
        Ok(())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.local.contains_key(code) || self.builtin.contains_key(code)
    }

    pub fn backend(&self, code: &str) -> Result<Arc<dyn PartnerBackend>, PartnerError> {
        let registration = self
            .local
            .get(code)
            .or_else(|| self.builtin.get(code))
            .ok_or_else(|| {
                error!(par_code = code, "파트너 백엔드가 등록되어 있지 않습니다");
                PartnerError::UnknownBackend(code.to_string())
            })?;

        debug!(par_code = code, "파트너 백엔드 조회");
        Ok(registration.get())
    }

    /// 두 계층에 등록된 모든 파트너 코드 (정렬됨).
    pub fn backend_list(&self) -> Vec<String> {
        self.builtin
            .keys()
            .chain(self.local.keys())
            .filter(|code| !code.starts_with(RESERVED_PREFIX))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn validate_code(code: &str) -> Result<(), PartnerError> {
    if PARTNER_CODE.is_match(code) {
        Ok(())
    } else {
        Err(PartnerError::InvalidCode(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::PartnerRegistry;
    use crate::partner::backend::PartnerBackend;
    use crate::partner::error::PartnerError;

    struct Named(&'static str);

    #[async_trait]
    impl PartnerBackend for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn backend_is_instantiated_once_per_code() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = created.clone();

        let mut registry = PartnerRegistry::new();
        registry
            .register_builtin("acme", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Arc::new(Named("Acme"))
            })
            .unwrap();

        let first = registry.backend("acme").unwrap();
        let second = registry.backend("acme").unwrap();

        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn local_registration_overrides_builtin() {
        let mut registry = PartnerRegistry::new();
        registry.register_builtin("acme", || Arc::new(Named("Acme builtin"))).unwrap();
        registry.register_local("acme", || Arc::new(Named("Acme local"))).unwrap();

        assert_eq!(registry.backend("acme").unwrap().name(), "Acme local");
        assert_eq!(registry.backend_list(), vec!["acme".to_string()]);
    }

    #[test]
    fn unknown_code_is_a_configuration_error() {
        let registry = PartnerRegistry::new();

        assert!(matches!(registry.backend("nobody"), Err(PartnerError::UnknownBackend(code)) if code == "nobody"));
    }

    #[test]
    fn backend_list_is_sorted_and_skips_reserved_codes() {
        let mut registry = PartnerRegistry::new();
        registry.register_builtin("zeta", || Arc::new(Named("Zeta"))).unwrap();
        registry.register_builtin("abstract_base", || Arc::new(Named("Base"))).unwrap();
        registry.register_local("alpha", || Arc::new(Named("Alpha"))).unwrap();

        assert_eq!(registry.backend_list(), vec!["alpha".to_string(), "zeta".to_string()]);
        assert!(registry.contains("abstract_base"));
    }

    #[test]
    fn invalid_codes_are_rejected() {
        let mut registry = PartnerRegistry::new();

        for code in ["", "Acme", "9lives", "a-b", "../etc"] {
            assert!(matches!(
                registry.register_builtin(code, || Arc::new(Named("x"))),
                Err(PartnerError::InvalidCode(_))
            ));
        }
    }
}
