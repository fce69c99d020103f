use super::*;

#[test]
fn verbosity_raises_the_default_level() {
    assert_eq!(default_directive(0), "specter=info");
    assert_eq!(default_directive(1), "specter=debug");
    assert_eq!(default_directive(7), "specter=trace");
}

#[test]
fn init_twice_is_harmless() {
    init(0);
    init(2);
    tracing::info!("still logging");
}
