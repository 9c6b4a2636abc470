//! Tests for the bounded context pool

#[cfg(test)]
mod tests {
    use crate::context::{ContextFactory, ContextType};
    use crate::types::ContextError;

    #[tokio::test]
    async fn try_create_rejects_beyond_capacity() {
        let factory = ContextFactory::new(1);

        let first = factory.try_create(ContextType::Invoke).unwrap();
        assert_eq!(factory.available(), 0);

        let err = factory.try_create(ContextType::Query).unwrap_err();
        assert_eq!(err, ContextError::PoolExhausted { max_size: 1 });

        factory.destroy(first);
        assert_eq!(factory.available(), 1);
        factory.try_create(ContextType::Query).unwrap();
    }

    #[tokio::test]
    async fn create_waits_for_a_released_slot() {
        let factory = std::sync::Arc::new(ContextFactory::new(2));

        let a = factory.create(ContextType::Invoke).await.unwrap();
        let b = factory.create(ContextType::Query).await.unwrap();
        assert_eq!(factory.available(), 0);

        // Release one slot from another task, then the pending create resolves
        let release = {
            let factory = factory.clone();
            tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                factory.destroy(a);
            })
        };
        let c = factory.create(ContextType::Invoke).await.unwrap();
        release.await.unwrap();

        assert_ne!(b.id(), c.id());
        assert_eq!(c.context_type(), ContextType::Invoke);
    }

    #[tokio::test]
    async fn dropping_a_context_releases_its_slot() {
        let factory = ContextFactory::new(1);
        {
            let _ctx = factory.try_create(ContextType::Direct).unwrap();
            assert_eq!(factory.available(), 0);
        }
        // Scope exit released the permit even without an explicit destroy
        assert_eq!(factory.available(), 1);
    }
}
