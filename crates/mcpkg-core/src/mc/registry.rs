use bitflags::bitflags;

use crate::container::dedup_push_by_identity;
use crate::error::{McError, McpMpError};
use crate::mp::{Reader, Writer};

use super::loader::{Loader, LoaderId};
use super::provider::{BaseUrl, Provider, ProviderId};
use super::version::{Codename, VersionFamily};

/// Default target Minecraft version used when seeding a minimal version
/// family and when no `MC_VERSION` environment override is set.
pub const DEFAULT_MC_VERSION: &str = "1.21.8";

bitflags! {
    /// Registry-wide flags, part of the documented `Mc` shape alongside
    /// `providers`/`loaders`/`versions`/the three current selections. The
    /// original C struct's `McPkgMc.flags` is set aside but never read or
    /// written by any of its own functions either; no bit is defined here
    /// yet, but the field is kept so a caller can stash registry-level
    /// state (e.g. "offline mode") without widening `Mc`'s shape later.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct McFlags: u32 {
    }
}

/// Registry of known providers, loaders and version families, plus one
/// independently-owned "current selection" per category.
///
/// `Mc` is not `Sync`: nothing here synchronizes concurrent mutation, the
/// same way the C struct was a plain heap object meant for single-threaded
/// or externally-locked use. [`crate::mc::global`] wraps one in a mutex for
/// callers that want a process-wide instance.
#[derive(Debug, Default)]
pub struct Mc {
    providers: Vec<Provider>,
    loaders: Vec<Loader>,
    versions: Vec<VersionFamily>,
    current_provider: Option<Provider>,
    current_loader: Option<Loader>,
    current_version: Option<VersionFamily>,
    flags: McFlags,
}

impl Mc {
    pub fn new() -> Self {
        Mc::default()
    }

    pub fn flags(&self) -> McFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: McFlags) {
        self.flags = flags;
    }

    // ---- seeding ------------------------------------------------------

    /// Populate the registry with the built-in provider templates.
    /// Idempotent: calling this twice does not duplicate entries, unlike
    /// the original C implementation which pushed onto the list
    /// unconditionally every call.
    pub fn seed_providers(&mut self) {
        for id in Provider::table() {
            dedup_push_by_identity(&mut self.providers, Provider::make(id), |p| p.id);
        }
    }

    pub fn seed_loaders(&mut self) {
        for id in Loader::table() {
            dedup_push_by_identity(&mut self.loaders, Loader::make(id), |l| l.id);
        }
    }

    /// Seed a single family with the default version, enough for code
    /// paths that need at least one entry to work against.
    pub fn seed_versions_minimal(&mut self) {
        let mut fam = VersionFamily::make(Codename::TrickyTrials);
        fam.versions.push(DEFAULT_MC_VERSION.to_string());
        dedup_push_by_identity(&mut self.versions, fam, |f| f.codename);
    }

    /// Full built-in canon set. Mirrors the original, which has not grown
    /// beyond the minimal seed yet either.
    pub fn seed_versions_all(&mut self) {
        self.seed_versions_minimal();
    }

    // ---- add / own ------------------------------------------------------

    pub fn add_provider(&mut self, p: Provider) {
        dedup_push_by_identity(&mut self.providers, p, |p| p.id);
    }

    pub fn add_loader(&mut self, l: Loader) {
        dedup_push_by_identity(&mut self.loaders, l, |l| l.id);
    }

    pub fn add_version_family(&mut self, vf: VersionFamily) {
        dedup_push_by_identity(&mut self.versions, vf, |f| f.codename);
    }

    // ---- find (borrowed) ------------------------------------------------

    pub fn find_provider_id(&self, id: ProviderId) -> Option<&Provider> {
        self.providers.iter().find(|p| p.id == id)
    }

    pub fn find_provider_name(&self, name: &str) -> Option<&Provider> {
        self.providers.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn find_loader_id(&self, id: LoaderId) -> Option<&Loader> {
        self.loaders.iter().find(|l| l.id == id)
    }

    pub fn find_loader_name(&self, name: &str) -> Option<&Loader> {
        self.loaders.iter().find(|l| l.name.eq_ignore_ascii_case(name))
    }

    pub fn find_family_code(&self, code: Codename) -> Option<&VersionFamily> {
        self.versions.iter().find(|f| f.codename == code)
    }

    pub fn find_family_slug(&self, slug: &str) -> Option<&VersionFamily> {
        self.find_family_code(Codename::from_str(slug))
    }

    // ---- current selection ----------------------------------------------

    pub fn set_current_provider(&mut self, p: Provider) {
        self.current_provider = Some(p);
    }

    /// Looks up `id` in the registry and stores an independent copy as the
    /// current selection: mutating the registry entry afterward does not
    /// affect what was just selected, mirroring the original's "keep a
    /// private owned copy" comment.
    pub fn set_current_provider_id(&mut self, id: ProviderId) -> Result<(), McError> {
        let found = self
            .find_provider_id(id)
            .ok_or_else(|| McError::NotFound(format!("provider {id:?}")))?;
        let mut copy = Provider::make(found.id);
        if let Some(base_url) = &found.base_url {
            copy.base_url = Some(BaseUrl::Owned(base_url.as_str().to_string()));
        }
        copy.flags = found.flags;
        self.current_provider = Some(copy);
        Ok(())
    }

    pub fn current_provider(&self) -> Option<&Provider> {
        self.current_provider.as_ref()
    }

    pub fn set_current_loader(&mut self, l: Loader) {
        self.current_loader = Some(l);
    }

    pub fn set_current_loader_id(&mut self, id: LoaderId) -> Result<(), McError> {
        let found = self
            .find_loader_id(id)
            .ok_or_else(|| McError::NotFound(format!("loader {id:?}")))?;
        let mut copy = Loader::make(found.id);
        if let Some(base_url) = &found.base_url {
            copy.base_url = Some(BaseUrl::Owned(base_url.as_str().to_string()));
        }
        copy.flags = found.flags;
        self.current_loader = Some(copy);
        Ok(())
    }

    pub fn current_loader(&self) -> Option<&Loader> {
        self.current_loader.as_ref()
    }

    pub fn set_current_family(&mut self, vf: VersionFamily) {
        self.current_version = Some(vf);
    }

    pub fn set_current_family_code(&mut self, code: Codename) -> Result<(), McError> {
        let found = self
            .find_family_code(code)
            .ok_or_else(|| McError::NotFound(format!("version family {code:?}")))?;
        self.current_version = Some(found.clone());
        Ok(())
    }

    pub fn current_family(&self) -> Option<&VersionFamily> {
        self.current_version.as_ref()
    }

    // ---- convenience lookups ---------------------------------------------

    pub fn latest_for_codename(&self, code: Codename) -> Option<&str> {
        self.find_family_code(code).and_then(VersionFamily::latest)
    }

    pub fn codename_from_version_in(&self, mc_version: &str) -> Codename {
        VersionFamily::codename_from_version(&self.versions, mc_version)
    }

    // ---- current-selection (de)serialization ------------------------------

    pub fn pack_current_provider(&self) -> Result<Vec<u8>, McError> {
        let p = self
            .current_provider
            .as_ref()
            .ok_or_else(|| McError::InvalidState("no current provider".into()))?;
        let mut w = Writer::new();
        p.write(&mut w).map_err(McError::from)?;
        Ok(w.finish())
    }

    pub fn unpack_current_provider(&mut self, buf: &[u8]) -> Result<(), McError> {
        let r = Reader::new(buf).map_err(McError::from)?;
        let p = Provider::read(&r).map_err(McError::from)?;
        self.current_provider = Some(p);
        Ok(())
    }

    pub fn pack_current_loader(&self) -> Result<Vec<u8>, McError> {
        let l = self
            .current_loader
            .as_ref()
            .ok_or_else(|| McError::InvalidState("no current loader".into()))?;
        let mut w = Writer::new();
        l.write(&mut w).map_err(McError::from)?;
        Ok(w.finish())
    }

    pub fn unpack_current_loader(&mut self, buf: &[u8]) -> Result<(), McError> {
        let r = Reader::new(buf).map_err(McError::from)?;
        let l = Loader::read(&r).map_err(McError::from)?;
        self.current_loader = Some(l);
        Ok(())
    }

    pub fn pack_current_family(&self) -> Result<Vec<u8>, McError> {
        let vf = self
            .current_version
            .as_ref()
            .ok_or_else(|| McError::InvalidState("no current version family".into()))?;
        let mut w = Writer::new();
        vf.write(&mut w).map_err(McError::from)?;
        Ok(w.finish())
    }

    pub fn unpack_current_family(&mut self, buf: &[u8]) -> Result<(), McError> {
        let r = Reader::new(buf).map_err(McError::from)?;
        let vf = VersionFamily::read(&r).map_err(McError::from)?;
        self.current_version = Some(vf);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_default_empty_and_are_settable() {
        let mut mc = Mc::new();
        assert_eq!(mc.flags(), McFlags::empty());
        mc.set_flags(McFlags::all());
        assert_eq!(mc.flags(), McFlags::all());
    }

    #[test]
    fn seeding_twice_does_not_duplicate() {
        let mut mc = Mc::new();
        mc.seed_providers();
        mc.seed_providers();
        assert_eq!(mc.providers.len(), 4);

        mc.seed_loaders();
        mc.seed_loaders();
        assert_eq!(mc.loaders.len(), 7);
    }

    #[test]
    fn set_current_provider_id_copies_independent_of_registry() {
        let mut mc = Mc::new();
        mc.seed_providers();
        mc.set_current_provider_id(ProviderId::Modrinth).unwrap();

        // mutate the registry entry afterward, on a field the copy does mirror
        if let Some(p) = self_find_mut(&mut mc, ProviderId::Modrinth) {
            p.set_base_url(Some("https://mutated.example".into()));
        }

        let current = mc.current_provider().unwrap();
        assert_eq!(
            current.base_url.as_ref().map(BaseUrl::as_str),
            Some("https://api.modrinth.com"),
            "current selection must be a detached copy"
        );
    }

    fn self_find_mut(mc: &mut Mc, id: ProviderId) -> Option<&mut Provider> {
        mc.providers.iter_mut().find(|p| p.id == id)
    }

    #[test]
    fn seeded_providers_are_online() {
        let mut mc = Mc::new();
        mc.seed_providers();
        let modrinth = mc.find_provider_name("MODRINTH").unwrap();
        assert_eq!(modrinth.id, ProviderId::Modrinth);
        assert_eq!(modrinth.base_url.as_ref().map(BaseUrl::as_str), Some("https://api.modrinth.com"));
        assert!(modrinth.online, "freshly seeded provider must report online");
    }

    #[test]
    fn unknown_provider_id_is_not_found() {
        let mc = Mc::new();
        assert!(mc.find_provider_id(ProviderId::Modrinth).is_none());
    }

    #[test]
    fn latest_for_codename_after_minimal_seed() {
        let mut mc = Mc::new();
        mc.seed_versions_minimal();
        assert_eq!(
            mc.latest_for_codename(Codename::TrickyTrials),
            Some(DEFAULT_MC_VERSION)
        );
    }

    #[test]
    fn pack_unpack_current_family_round_trips() {
        let mut mc = Mc::new();
        mc.seed_versions_minimal();
        mc.set_current_family_code(Codename::TrickyTrials).unwrap();

        let bytes = mc.pack_current_family().unwrap();

        let mut other = Mc::new();
        other.unpack_current_family(&bytes).unwrap();
        assert_eq!(
            other.current_family().unwrap().codename,
            Codename::TrickyTrials
        );
    }
}
