use super::*;
use crate::mc::{Codename, LoaderId, ProviderId};

#[test]
fn seed_select_and_pack_the_active_stack() {
    let mut mc = Mc::new();
    mc.seed_providers();
    mc.seed_loaders();
    mc.seed_versions_minimal();

    mc.set_current_provider_id(ProviderId::Modrinth).unwrap();
    mc.set_current_loader_id(LoaderId::Fabric).unwrap();
    mc.set_current_family_code(Codename::TrickyTrials).unwrap();

    let provider_bytes = mc.pack_current_provider().unwrap();
    let loader_bytes = mc.pack_current_loader().unwrap();
    let family_bytes = mc.pack_current_family().unwrap();

    let mut restored = Mc::new();
    restored.unpack_current_provider(&provider_bytes).unwrap();
    restored.unpack_current_loader(&loader_bytes).unwrap();
    restored.unpack_current_family(&family_bytes).unwrap();

    assert_eq!(restored.current_provider().unwrap().id, ProviderId::Modrinth);
    assert_eq!(restored.current_loader().unwrap().id, LoaderId::Fabric);
    assert_eq!(
        restored.current_family().unwrap().codename,
        Codename::TrickyTrials
    );
}

#[test]
fn missing_current_selection_is_invalid_state() {
    let mc = Mc::new();
    let err = mc.pack_current_provider().unwrap_err();
    assert!(matches!(err, McError::InvalidState(_)));
}

#[test]
fn digest_mismatch_on_read_is_rejected() {
    let mut w = mp::Writer::new();
    w.map_begin(4).unwrap();
    w.write_header("digest", 1).unwrap();
    w.kv_u32(2, Algo::Sha1 as u32).unwrap();
    w.kv_str(3, "not-hex-at-all").unwrap();
    let bytes = w.finish();

    let r = mp::Reader::new(&bytes).unwrap();
    assert!(Digest::read(&r).is_err());
}
