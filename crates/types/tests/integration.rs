//! Integration tests for types crate

#[cfg(test)]
mod tests {
    use artifetch_errors::{Error, FetchError};
    use artifetch_types::*;
    use std::path::Path;

    #[test]
    fn test_outcome_success() {
        let job = Job::new("./modules/a", "vendor/a").unwrap();
        let outcome = Outcome::new(job.clone(), 3, 1, Ok(()));

        assert!(outcome.is_success());
        assert!(outcome.error().is_none());
        assert_eq!(outcome.job(), &job);
        assert_eq!(outcome.destination(), Path::new("vendor/a"));
        assert_eq!(outcome.index(), 3);
        assert_eq!(outcome.worker(), Some(1));
    }

    #[test]
    fn test_outcome_failure_keeps_error() {
        let job = Job::new("./missing", "vendor/missing").unwrap();
        let err: Error = FetchError::SourceNotFound {
            path: "./missing".into(),
        }
        .into();
        let outcome = Outcome::new(job, 0, 0, Err(err));

        assert!(!outcome.is_success());
        assert!(matches!(
            outcome.error(),
            Some(Error::Fetch(FetchError::SourceNotFound { .. }))
        ));
    }

    #[test]
    fn test_job_is_serializable() {
        let job = Job::new("git::https://example.com/a.git", "vendor/a")
            .unwrap()
            .with_strip_vcs(true);
        let rendered = toml::to_string(&job).unwrap();
        assert!(rendered.contains("strip_vcs = true"));
        assert!(rendered.contains("mode = \"directory\""));
    }
}
