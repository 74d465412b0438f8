use crate::workflows::pipeline::domain::Stage;
use crate::workflows::pipeline::policy::{PolicyParseError, TransitionPolicy};

#[test]
fn permissive_policy_allows_every_pair() {
    let policy = TransitionPolicy::permissive();
    for from in Stage::ALL {
        for to in Stage::ALL {
            assert!(policy.allows(from, to), "{from} -> {to} should be allowed");
        }
    }
    assert_eq!(policy.transitions().count(), 20);
}

#[test]
fn forward_policy_blocks_backward_moves() {
    let policy = TransitionPolicy::forward();
    assert!(policy.allows(Stage::Applied, Stage::Hired));
    assert!(policy.allows(Stage::Offer, Stage::Offer));
    assert!(!policy.allows(Stage::Hired, Stage::Applied));
    assert!(!policy.allows(Stage::Interview, Stage::Shortlisted));
}

#[test]
fn sequential_policy_only_allows_next_stage() {
    let policy = TransitionPolicy::sequential();
    assert!(policy.allows(Stage::Applied, Stage::Shortlisted));
    assert!(!policy.allows(Stage::Applied, Stage::Interview));
    assert!(!policy.allows(Stage::Hired, Stage::Offer));
    assert_eq!(policy.transitions().count(), 4);
}

#[test]
fn parses_presets_and_explicit_lists() {
    assert_eq!(
        "Forward".parse::<TransitionPolicy>(),
        Ok(TransitionPolicy::forward())
    );
    assert_eq!(
        " permissive ".parse::<TransitionPolicy>(),
        Ok(TransitionPolicy::permissive())
    );

    let policy: TransitionPolicy = "Applied->Shortlisted, Offer->Applied"
        .parse()
        .expect("explicit list parses");
    assert_eq!(policy.name(), "custom");
    assert!(policy.allows(Stage::Offer, Stage::Applied));
    assert!(!policy.allows(Stage::Applied, Stage::Offer));
}

#[test]
fn rejects_malformed_policies() {
    assert_eq!(
        "".parse::<TransitionPolicy>(),
        Err(PolicyParseError::Empty)
    );
    assert!(matches!(
        "Applied=>Offer".parse::<TransitionPolicy>(),
        Err(PolicyParseError::MalformedTransition(_))
    ));
    assert!(matches!(
        "Applied->Rejected".parse::<TransitionPolicy>(),
        Err(PolicyParseError::Stage(_))
    ));
}
