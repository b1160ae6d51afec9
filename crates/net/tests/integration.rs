//! Integration tests for net crate

#[cfg(test)]
mod tests {
    use artifetch_errors::{Error, FetchError};
    use artifetch_net::*;
    use artifetch_types::FetchMode;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn router(base: &std::path::Path) -> DefaultTransport {
        DefaultTransport::from_parts(
            LocalTransport::with_base_dir(base),
            GitTransport::with_program("artifetch-no-such-git-binary"),
            HttpTransport::new(NetClient::with_defaults().unwrap()),
        )
    }

    #[tokio::test]
    async fn test_router_dispatches_local_sources() {
        let temp = TempDir::new().unwrap();
        tokio::fs::create_dir_all(temp.path().join("charts/redis"))
            .await
            .unwrap();
        tokio::fs::write(temp.path().join("charts/redis/Chart.yaml"), "name: redis")
            .await
            .unwrap();

        let transport: Arc<dyn Transport> = Arc::new(router(temp.path()));
        let dest = temp.path().join("vendor/redis.tmp");
        transport
            .fetch("./charts/redis", &dest, FetchMode::Directory)
            .await
            .unwrap();

        assert!(dest.join("Chart.yaml").is_file());
    }

    #[tokio::test]
    async fn test_router_dispatches_git_sources() {
        let temp = TempDir::new().unwrap();
        let transport = router(temp.path());

        let err = transport
            .fetch(
                "git@github.com:org/modules.git//katalog?ref=v1.0.0",
                &temp.path().join("out"),
                FetchMode::Directory,
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Fetch(FetchError::CommandFailed { ref program, .. }) if program == "artifetch-no-such-git-binary"
        ));
    }

    #[tokio::test]
    async fn test_router_rejects_unknown_forced_scheme() {
        let temp = TempDir::new().unwrap();
        let transport = router(temp.path());

        let err = transport
            .fetch("s3::bucket/key", &temp.path().join("out"), FetchMode::Any)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Fetch(FetchError::UnsupportedScheme { .. })));
    }

    #[test]
    fn test_display_source_matches_locator_shapes() {
        assert_eq!(
            display_source("git@github.com:sighupio/fury-kubernetes-monitoring.git//katalog/prometheus-operator?ref=v1.14.1"),
            "sighupio/fury-kubernetes-monitoring.git/katalog/prometheus-operator?ref=v1.14.1"
        );
        assert_eq!(
            display_source("https://github.com/org/repo.git//roles"),
            "github.com/org/repo.git/roles"
        );
    }
}
