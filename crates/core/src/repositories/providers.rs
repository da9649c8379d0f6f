//! Provider registration.

use crate::ids::ProviderId;
use crate::models::{NewProvider, Provider};
use crate::repositories::shared::ClinicContext;
use crate::ClinicResult;

#[derive(Clone, Debug)]
pub struct ProviderService {
    ctx: ClinicContext,
}

impl ProviderService {
    pub fn new(ctx: ClinicContext) -> Self {
        Self { ctx }
    }

    /// Register a provider.
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank names or a malformed phone or email, and
    /// `ClinicError::UnknownReference` for an unknown gender or provider type.
    pub fn register(&self, new: NewProvider) -> ClinicResult<Provider> {
        let provider = self.ctx.store().write(|data| {
            let id: ProviderId = data.allocate();
            let provider = Provider::register(id, new)?;
            data.insert_provider(provider.clone())?;
            Ok(provider)
        })?;

        tracing::info!("registered provider {}", provider.id);
        Ok(provider)
    }

    pub fn get(&self, id: ProviderId) -> ClinicResult<Provider> {
        self.ctx.store().read(|data| data.provider(id).cloned())?
    }

    pub fn list(&self) -> ClinicResult<Vec<Provider>> {
        self.ctx
            .store()
            .read(|data| data.providers().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::LookupId;
    use crate::repositories::shared::testing::context_on;
    use crate::test_support::{date, new_provider};
    use crate::ClinicError;

    #[test]
    fn register_then_get() {
        let service = ProviderService::new(context_on(date(2024, 3, 10)));
        let provider = service.register(new_provider()).expect("register");
        assert_eq!(service.get(provider.id).unwrap(), provider);
        assert_eq!(service.list().unwrap().len(), 1);
        assert_eq!(provider.to_string(), "Tester, Tess");
    }

    #[test]
    fn unknown_provider_type_is_rejected() {
        let service = ProviderService::new(context_on(date(2024, 3, 10)));
        let mut new = new_provider();
        new.provider_type = LookupId(40);
        let err = service.register(new).expect_err("unknown type");
        assert!(matches!(err, ClinicError::UnknownReference { .. }));
        assert!(service.list().unwrap().is_empty());
    }
}
