//! Implementation of the `sportcache clear` command.

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use serde::Serialize;

use crate::cli::open_cache;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, InvalidationMatcher};

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .args(["all", "key", "endpoint", "endpoint_prefix", "endpoint_contains"]),
))]
pub struct ClearArgs {
    /// Remove every entry
    #[arg(long)]
    pub all: bool,

    /// Remove one entry by its full key
    #[arg(long, value_name = "KEY")]
    pub key: Option<String>,

    /// Remove entries for exactly this endpoint
    #[arg(long, value_name = "ENDPOINT")]
    pub endpoint: Option<String>,

    /// Remove entries whose endpoint starts with this prefix
    #[arg(long, value_name = "PREFIX")]
    pub endpoint_prefix: Option<String>,

    /// Remove entries whose endpoint contains this text
    #[arg(long, value_name = "TEXT")]
    pub endpoint_contains: Option<String>,
}

impl ClearArgs {
    pub fn matcher(&self) -> InvalidationMatcher {
        if let Some(key) = &self.key {
            InvalidationMatcher::Key(key.clone())
        } else if let Some(endpoint) = &self.endpoint {
            InvalidationMatcher::Endpoint(endpoint.clone())
        } else if let Some(prefix) = &self.endpoint_prefix {
            InvalidationMatcher::EndpointPrefix(prefix.clone())
        } else if let Some(fragment) = &self.endpoint_contains {
            InvalidationMatcher::EndpointContains(fragment.clone())
        } else {
            InvalidationMatcher::All
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClearOutput {
    pub matcher: InvalidationMatcher,
    pub deleted: u64,
}

impl CommandOutput for ClearOutput {
    fn to_human(&self) -> String {
        format!("Cleared {} entr{} ({})", self.deleted, if self.deleted == 1 { "y" } else { "ies" }, self.matcher)
    }
}

pub async fn execute(args: ClearArgs, config: &Config, json_mode: bool) -> Result<()> {
    let matcher = args.matcher();
    let cache = open_cache(config).await?;
    let deleted = cache
        .invalidate(&matcher)
        .await
        .with_context(|| format!("Failed to clear {matcher}"))?;

    output(&ClearOutput { matcher, deleted }, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: ClearArgs,
    }

    fn parse(argv: &[&str]) -> Result<ClearArgs, clap::Error> {
        let mut full = vec!["clear"];
        full.extend_from_slice(argv);
        Harness::try_parse_from(full).map(|h| h.args)
    }

    #[test]
    fn test_target_is_required() {
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn test_targets_are_exclusive() {
        assert!(parse(&["--all", "--endpoint", "odds"]).is_err());
    }

    #[test]
    fn test_matcher_selection() {
        assert_eq!(parse(&["--all"]).unwrap().matcher(), InvalidationMatcher::All);
        assert_eq!(
            parse(&["--endpoint-prefix", "h2h"]).unwrap().matcher(),
            InvalidationMatcher::EndpointPrefix("h2h".to_string())
        );
        assert_eq!(
            parse(&["--endpoint-contains", "live"]).unwrap().matcher(),
            InvalidationMatcher::EndpointContains("live".to_string())
        );
        assert_eq!(
            parse(&["--key", "leagues:{}"]).unwrap().matcher(),
            InvalidationMatcher::Key("leagues:{}".to_string())
        );
    }

    #[test]
    fn test_human_output() {
        let out = ClearOutput {
            matcher: InvalidationMatcher::EndpointPrefix("h2h".to_string()),
            deleted: 2,
        };
        assert_eq!(out.to_human(), "Cleared 2 entries (endpoint_prefix=h2h)");
    }
}
