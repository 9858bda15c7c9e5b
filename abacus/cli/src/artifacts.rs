use {
    abacus_checker::{ContractReader, CoreInvariantChecker},
    abacus_types::CoreDeploy,
    anyhow::Context,
    std::{fs, path::Path},
};

/// Reads the deployment records of every domain, in the order they are to be
/// checked and reported.
pub fn load_deploys(path: &Path) -> anyhow::Result<Vec<CoreDeploy>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read deployments from {}", path.display()))?;

    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse deployments from {}", path.display()))
}

/// Writes `<chain name>.json` into `dir` for every domain whose contracts are
/// all defined. Domains with missing contracts are skipped; the check reports
/// them.
pub fn write_verification_inputs<R>(
    checker: &CoreInvariantChecker<R>,
    dir: &Path,
) -> anyhow::Result<()>
where
    R: ContractReader,
{
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))?;

    for deploy in checker.deploys() {
        let inputs = match checker.verification_inputs(deploy) {
            Ok(inputs) => inputs,
            Err(err) => {
                tracing::warn!(
                    chain = %deploy.chain.name,
                    %err,
                    "Skipping verification inputs"
                );
                continue;
            },
        };

        let path = dir.join(format!("{}.json", deploy.chain.name));

        fs::write(&path, serde_json::to_string_pretty(&inputs)?)
            .with_context(|| format!("failed to write {}", path.display()))?;

        tracing::info!(
            chain = %deploy.chain.name,
            path = %path.display(),
            contracts = inputs.len(),
            "Wrote verification inputs"
        );
    }

    Ok(())
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {
        super::*,
        abacus_checker::VerificationInput,
        abacus_testing::Fixture,
    };

    #[test]
    fn loading_deploys_keeps_order() {
        let fixture = Fixture::consistent(&[2000, 1000], 1000);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        fs::write(&path, serde_json::to_string(&fixture.deploys).unwrap()).unwrap();

        let deploys = load_deploys(&path).unwrap();

        assert_eq!(deploys, fixture.deploys);
    }

    #[test]
    fn loading_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();

        assert!(load_deploys(&dir.path().join("nope.json")).is_err());
    }

    #[test]
    fn writing_verification_inputs() {
        let mut fixture = Fixture::consistent(&[1000, 2000], 1000);
        fixture.deploy_mut(2000).contracts.validator_manager = None;

        let checker = fixture.into_checker();
        let dir = tempfile::tempdir().unwrap();

        write_verification_inputs(&checker, dir.path()).unwrap();

        let written: Vec<VerificationInput> = serde_json::from_str(
            &fs::read_to_string(dir.path().join("chain-1000.json")).unwrap(),
        )
        .unwrap();

        assert_eq!(
            written,
            checker.verification_inputs(&checker.deploys()[0]).unwrap()
        );
        assert!(!dir.path().join("chain-2000.json").exists());
    }
}
