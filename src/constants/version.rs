use semver::Version;

/// placeholder vergen writes when it could not read the git sha.
const IDEMPOTENT_SHA: &str = "VERGEN_IDEMPOTENT_OUTPUT";

pub fn get_version() -> String {
    let semver = env!("CARGO_PKG_VERSION").parse::<Version>();

    match (semver, option_env!("VERGEN_GIT_SHA")) {
        (Ok(semver), Some(sha)) if sha != IDEMPOTENT_SHA => format!("{semver} ({sha})"),
        (Ok(semver), _) => semver.to_string(),
        (Err(e), _) => {
            tracing::warn!(
                err = ?e,
                "couldn't parse a semver out of Cargo.toml? defaulting to 0.0.0-unknown."
            );
            String::from("0.0.0-unknown")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_starts_with_package_version() {
        let version = get_version();

        assert!(version.starts_with(env!("CARGO_PKG_VERSION")));
        assert!(!version.contains(IDEMPOTENT_SHA));
    }
}
