//! Synthetic risks attached to conditional edges.

use fauxinnati_core::{ConditionalUpdateRisk, MatchingRule};

/// PromQL expression that yields a sample on every cluster.
pub const PROMQL_ALWAYS_MATCHES: &str = "vector(1)";
/// PromQL expression that never yields a matching sample.
pub const PROMQL_NEVER_MATCHES: &str = "vector(0)";

const DOCS_BASE: &str = "https://docs.openshift.com";

fn risk(path: &str, name: &str, message: &str, rule: MatchingRule) -> ConditionalUpdateRisk {
    ConditionalUpdateRisk::new(&format!("{DOCS_BASE}/{path}"), name, message, rule)
}

pub fn synthetic_always() -> ConditionalUpdateRisk {
    risk(
        "synthetic-risk",
        "SyntheticRisk",
        "This is a synthetic risk that always applies for testing purposes",
        MatchingRule::Always,
    )
}

pub fn synthetic_promql_matching() -> ConditionalUpdateRisk {
    risk(
        "synthetic-risk-promql",
        "SyntheticRisk",
        "This is a synthetic risk with PromQL that always matches in OpenShift clusters",
        MatchingRule::promql(PROMQL_ALWAYS_MATCHES),
    )
}

pub fn synthetic_promql_nonmatching() -> ConditionalUpdateRisk {
    risk(
        "synthetic-risk-promql-nonmatching",
        "SyntheticRisk",
        "This is a synthetic risk with PromQL that never matches in OpenShift clusters",
        MatchingRule::promql(PROMQL_NEVER_MATCHES),
    )
}

pub fn smoke_always() -> ConditionalUpdateRisk {
    risk(
        "synthetic-risk-smoke",
        "RiskA",
        "This is a synthetic risk with Always type for smoke testing",
        MatchingRule::Always,
    )
}

pub fn smoke_matching() -> ConditionalUpdateRisk {
    risk(
        "synthetic-risk-smoke-promql",
        "RiskBMatches",
        "This is a synthetic risk with PromQL that matches for smoke testing",
        MatchingRule::promql(PROMQL_ALWAYS_MATCHES),
    )
}

pub fn smoke_nonmatching() -> ConditionalUpdateRisk {
    risk(
        "synthetic-risk-smoke-promql-nomatch",
        "RiskCNoMatch",
        "This is a synthetic risk with PromQL that never matches for smoke testing",
        MatchingRule::promql(PROMQL_NEVER_MATCHES),
    )
}

/// The three smoke risks as attached together to a single edge pair.
pub fn smoke_combined() -> [ConditionalUpdateRisk; 3] {
    [
        risk(
            "synthetic-risk-smoke-combined-a",
            "RiskA",
            "This is RiskA part of combined risks for smoke testing",
            MatchingRule::Always,
        ),
        risk(
            "synthetic-risk-smoke-combined-b",
            "RiskBMatches",
            "This is RiskBMatches part of combined risks for smoke testing",
            MatchingRule::promql(PROMQL_ALWAYS_MATCHES),
        ),
        risk(
            "synthetic-risk-smoke-combined-c",
            "RiskCNoMatch",
            "This is RiskCNoMatch part of combined risks for smoke testing",
            MatchingRule::promql(PROMQL_NEVER_MATCHES),
        ),
    ]
}
