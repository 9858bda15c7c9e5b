use {
    crate::CheckResult,
    abacus_types::{CoreDeploy, Domain},
    async_trait::async_trait,
    futures::future::try_join_all,
    serde::Serialize,
    std::{
        fmt,
        sync::atomic::{AtomicUsize, Ordering},
    },
    tokio::sync::mpsc,
};

/// A deployment of a protocol onto one domain.
pub trait Deployment: Send + Sync {
    fn domain(&self) -> Domain;
}

impl Deployment for CoreDeploy {
    fn domain(&self) -> Domain {
        CoreDeploy::domain(self)
    }
}

/// The set of invariants that every deployment of a protocol must satisfy.
#[async_trait]
pub trait InvariantSuite: Send + Sync {
    type Deploy: Deployment;
    type Violation: fmt::Display + Send + 'static;
    /// Facts about the deployment as a whole, gathered once per run before
    /// any deployment is checked.
    type Context: Send + Sync;

    async fn prepare(&self, deploys: &[Self::Deploy]) -> CheckResult<Self::Context>;

    /// Checks `deploy`, one of `deploys`, sending every violation found to
    /// `sink`. Returns an error only if the state needed to decide an
    /// invariant could not be read.
    async fn check_deploy(
        &self,
        deploys: &[Self::Deploy],
        context: &Self::Context,
        deploy: &Self::Deploy,
        sink: &ViolationSink<Self::Violation>,
    ) -> CheckResult<()>;
}

/// The sending half of a run's violation collector, bound to one deployment.
pub struct ViolationSink<V> {
    index: usize,
    domain: Domain,
    found: AtomicUsize,
    tx: mpsc::UnboundedSender<(usize, V)>,
}

impl<V> ViolationSink<V>
where
    V: fmt::Display,
{
    pub fn add(&self, violation: V) {
        tracing::warn!(domain = self.domain, %violation, "Invariant violated");

        self.found.fetch_add(1, Ordering::Relaxed);

        // The receiver outlives every sink of the run.
        let _ = self.tx.send((self.index, violation));
    }

    pub fn extend<I>(&self, violations: I)
    where
        I: IntoIterator<Item = V>,
    {
        for violation in violations {
            self.add(violation);
        }
    }

    /// Number of violations sent through this sink so far.
    pub fn found(&self) -> usize {
        self.found.load(Ordering::Relaxed)
    }
}

/// Runs an [`InvariantSuite`] against every deployment of one protocol
/// instance.
pub struct InvariantChecker<S: InvariantSuite> {
    suite: S,
    deploys: Vec<S::Deploy>,
}

impl<S> InvariantChecker<S>
where
    S: InvariantSuite,
{
    pub fn new(suite: S, deploys: Vec<S::Deploy>) -> Self {
        Self { suite, deploys }
    }

    pub fn deploys(&self) -> &[S::Deploy] {
        &self.deploys
    }

    /// Checks every deployment, concurrently, and returns all violations found.
    ///
    /// Violations are ordered by the position of the offending deployment in
    /// the list the checker was created with, then by the order in which they
    /// were detected. Each run starts from an empty report.
    pub async fn run_all(&self) -> CheckResult<Report<S::Violation>> {
        let context = self.suite.prepare(&self.deploys).await?;
        let context = &context;

        let (tx, rx) = mpsc::unbounded_channel();

        let checks = try_join_all(self.deploys.iter().enumerate().map(|(index, deploy)| {
            let sink = ViolationSink {
                index,
                domain: deploy.domain(),
                found: AtomicUsize::new(0),
                tx: tx.clone(),
            };

            async move {
                tracing::info!(domain = deploy.domain(), "Checking deployment");

                self.suite
                    .check_deploy(&self.deploys, context, deploy, &sink)
                    .await?;

                tracing::info!(
                    domain = deploy.domain(),
                    violations = sink.found(),
                    "Deployment checked"
                );

                CheckResult::Ok(())
            }
        }));

        // Only the sinks may keep the channel open, so the collector finishes
        // once every check has.
        drop(tx);

        let (outcome, mut violations) = tokio::join!(checks, collect(rx));
        outcome?;

        violations.sort_by_key(|(index, _)| *index);

        let report = Report {
            violations: violations.into_iter().map(|(_, violation)| violation).collect(),
        };

        tracing::info!(
            deploys = self.deploys.len(),
            violations = report.len(),
            "Invariant check finished"
        );

        Ok(report)
    }
}

async fn collect<V>(mut rx: mpsc::UnboundedReceiver<(usize, V)>) -> Vec<(usize, V)> {
    let mut violations = Vec::new();

    while let Some(violation) = rx.recv().await {
        violations.push(violation);
    }

    violations
}

/// The violations found by one run of an [`InvariantChecker`].
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Report<V> {
    violations: Vec<V>,
}

impl<V> Report<V> {
    /// Whether every invariant holds.
    pub fn is_consistent(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[V] {
        &self.violations
    }

    /// Turns an inconsistent report into an error, for gating tests or CI.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_consistent() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Report<crate::Violation> {
    /// The violations attributed to the given domain.
    pub fn for_domain(&self, domain: Domain) -> impl Iterator<Item = &crate::Violation> {
        self.violations
            .iter()
            .filter(move |violation| violation.domain() == domain)
    }
}

impl<V> fmt::Display for Report<V>
where
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_consistent() {
            return f.write_str("deployment is consistent");
        }

        write!(
            f,
            "deployment is inconsistent, {} violation(s):",
            self.violations.len()
        )?;

        for violation in &self.violations {
            write!(f, "\n  {violation}")?;
        }

        Ok(())
    }
}

impl<V> std::error::Error for Report<V> where V: fmt::Debug + fmt::Display {}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    struct Fake(Domain);

    impl Deployment for Fake {
        fn domain(&self) -> Domain {
            self.0
        }
    }

    /// Reports one violation per deployment that follows it in the list, with
    /// later deployments finishing first.
    struct CountFollowers;

    #[async_trait]
    impl InvariantSuite for CountFollowers {
        type Context = ();
        type Deploy = Fake;
        type Violation = String;

        async fn prepare(&self, _deploys: &[Fake]) -> CheckResult<()> {
            Ok(())
        }

        async fn check_deploy(
            &self,
            deploys: &[Fake],
            _context: &(),
            deploy: &Fake,
            sink: &ViolationSink<String>,
        ) -> CheckResult<()> {
            let position = deploys.iter().position(|d| d.0 == deploy.0).unwrap();

            for _ in 0..position {
                tokio::task::yield_now().await;
            }

            for follower in &deploys[position + 1..] {
                sink.add(format!("{} -> {}", deploy.0, follower.0));
            }

            Ok(())
        }
    }

    #[tokio::test]
    async fn violations_follow_deployment_order() {
        let checker = InvariantChecker::new(CountFollowers, vec![Fake(3), Fake(1), Fake(2)]);

        let report = checker.run_all().await.unwrap();

        assert_eq!(report.violations(), ["3 -> 1", "3 -> 2", "1 -> 2"]);
    }

    #[tokio::test]
    async fn runs_do_not_accumulate() {
        let checker = InvariantChecker::new(CountFollowers, vec![Fake(1), Fake(2)]);

        assert_eq!(checker.run_all().await.unwrap().len(), 1);
        assert_eq!(checker.run_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_report_is_consistent() {
        let checker = InvariantChecker::new(CountFollowers, vec![Fake(1)]);

        let report = checker.run_all().await.unwrap();

        assert!(report.is_consistent());
        assert!(report.is_empty());
        assert_eq!(report.to_string(), "deployment is consistent");
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn inconsistent_report_is_an_error() {
        let report = Report {
            violations: vec!["a".to_string(), "b".to_string()],
        };

        let err = report.into_result().unwrap_err();

        assert_eq!(
            err.to_string(),
            "deployment is inconsistent, 2 violation(s):\n  a\n  b"
        );
    }
}
