use super::*;

#[test]
fn second_install_keeps_existing_subscriber() {
    init_tracing("client_core=debug");
    assert!(!init_tracing("client_core=info"));
}
