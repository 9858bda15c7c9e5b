use {
    abacus_checker::{Report, Violation},
    abacus_types::CoreDeploy,
    colored::Colorize,
};

/// Renders the report grouped by domain, in the order the deployments were
/// given.
pub fn render_text(report: &Report<Violation>, deploys: &[CoreDeploy]) -> String {
    let mut lines = Vec::new();

    for deploy in deploys {
        let violations = report.for_domain(deploy.domain()).collect::<Vec<_>>();
        let header = format!("{} (domain {})", deploy.chain.name, deploy.domain());

        if violations.is_empty() {
            lines.push(format!("{} {}", "✔".green(), header.bold()));
            continue;
        }

        lines.push(format!(
            "{} {} - {} violation(s)",
            "✘".red(),
            header.bold(),
            violations.len()
        ));
        lines.extend(violations.iter().map(|violation| format!("    {violation}")));
    }

    let summary = if report.is_consistent() {
        "deployment is consistent".green()
    } else {
        format!("deployment is inconsistent: {} violation(s)", report.len()).red()
    };

    lines.push(summary.to_string());
    lines.push(String::new());

    lines.join("\n")
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, abacus_testing::Fixture, alloy::primitives::Address};

    #[tokio::test]
    async fn rendering_violations_under_their_domain() {
        colored::control::set_override(false);

        let mut fixture = Fixture::consistent(&[1000, 2000], 1000);
        let home = fixture.contracts(2000).home.proxy;
        fixture.reader.contract_mut(2000, home).validator_manager = Address::ZERO;

        let checker = fixture.into_checker();
        let report = checker.run_all().await.unwrap();

        let text = render_text(&report, checker.deploys());
        let lines = text.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], "✔ chain-1000 (domain 1000)");
        assert_eq!(lines[1], "✘ chain-2000 (domain 2000) - 1 violation(s)");
        assert!(lines[2].starts_with("    [2000] home validator manager is"));
        assert_eq!(lines[3], "deployment is inconsistent: 1 violation(s)");
    }
}
