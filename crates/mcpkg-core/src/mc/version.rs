use crate::container::StringList;
use crate::error::McpMpError;
use crate::mp::{Reader, Tag, Writer};

/// Stable numeric codename identity, kept in declaration order because the
/// wire format stores the enum's numeric value directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codename {
    Unknown,
    TrickyTrials,
    TrailsAndTales,
    TheWild,
    CavesAndCliffsTwo,
    CavesAndCliffsOne,
    NetherUpdate,
    BuzzyBees,
    VillageAndPillage,
    Aquatic,
    WorldOfColor,
    Exploration,
    Frostburn,
    Combat,
    Bountiful,
    ChangedTheWorld,
    Horse,
    Redstone,
    PrettyScary,
    VillagerTrading,
    Faithful,
    SpawnEgg,
    Adventure,
}

const CODENAME_SLUGS: &[(&str, Codename)] = &[
    ("unknown", Codename::Unknown),
    ("tricky_trials", Codename::TrickyTrials),
    ("trails_and_tales", Codename::TrailsAndTales),
    ("the_wild", Codename::TheWild),
    ("caves_and_cliffs_two", Codename::CavesAndCliffsTwo),
    ("caves_and_cliffs_one", Codename::CavesAndCliffsOne),
    ("nether_update", Codename::NetherUpdate),
    ("buzzy_bees", Codename::BuzzyBees),
    ("village_and_pillage", Codename::VillageAndPillage),
    ("aquatic", Codename::Aquatic),
    ("world_of_color", Codename::WorldOfColor),
    ("exploration", Codename::Exploration),
    ("frostburn", Codename::Frostburn),
    ("combat", Codename::Combat),
    ("bountiful", Codename::Bountiful),
    ("changed_the_world", Codename::ChangedTheWorld),
    ("horse", Codename::Horse),
    ("redstone", Codename::Redstone),
    ("pretty_scary", Codename::PrettyScary),
    ("villager_trading", Codename::VillagerTrading),
    ("faithful", Codename::Faithful),
    ("spawn_egg", Codename::SpawnEgg),
    ("adventure", Codename::Adventure),
];

impl Codename {
    fn to_wire(self) -> i32 {
        CODENAME_SLUGS
            .iter()
            .position(|(_, c)| *c == self)
            .expect("every Codename variant is listed in CODENAME_SLUGS") as i32
    }

    fn from_wire(v: i32) -> Self {
        CODENAME_SLUGS
            .get(v as usize)
            .map(|(_, c)| *c)
            .unwrap_or(Codename::Unknown)
    }

    pub fn as_str(self) -> &'static str {
        CODENAME_SLUGS[self.to_wire() as usize].0
    }

    pub fn from_str(s: &str) -> Self {
        CODENAME_SLUGS
            .iter()
            .find(|(slug, _)| slug.eq_ignore_ascii_case(s))
            .map(|(_, c)| *c)
            .unwrap_or(Codename::Unknown)
    }
}

/// A named release family: a codename plus the list of Minecraft version
/// strings belonging to it, ordered newest to oldest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionFamily {
    pub codename: Codename,
    pub snapshot: bool,
    pub versions: StringList,
}

impl VersionFamily {
    pub fn make(codename: Codename) -> Self {
        VersionFamily {
            codename,
            snapshot: false,
            versions: Vec::new(),
        }
    }

    /// The newest version in this family, if any.
    pub fn latest(&self) -> Option<&str> {
        self.versions.first().map(String::as_str)
    }

    /// Finds which family (if any) in `families` lists `mc_version`.
    pub fn codename_from_version<'a>(
        families: impl IntoIterator<Item = &'a VersionFamily>,
        mc_version: &str,
    ) -> Codename {
        for fam in families {
            if fam.versions.iter().any(|v| v == mc_version) {
                return fam.codename;
            }
        }
        Codename::Unknown
    }

    pub fn write(&self, w: &mut Writer) -> Result<(), McpMpError> {
        w.map_begin(5)?;
        w.write_header(Tag::VersionFamily.as_str(), Tag::VersionFamily.version())?;
        w.kv_i32(2, self.codename.to_wire())?;
        w.kv_i32(3, if self.snapshot { 1 } else { 0 })?;
        w.kv_strlist(4, &self.versions)?;
        Ok(())
    }

    pub fn read(r: &Reader) -> Result<Self, McpMpError> {
        let version = r.expect_tag(Tag::VersionFamily.as_str())?;
        if version < 1 {
            return Err(McpMpError::Parse(
                "version family version must be >= 1".into(),
            ));
        }
        let codename_wire = r
            .get_i64(2)?
            .ok_or_else(|| McpMpError::Parse("missing codename".into()))?;
        let snapshot = r.get_i64(3)?.map(|v| v != 0).unwrap_or(false);
        let versions = r.get_strlist_dup(4)?.unwrap_or_default();

        Ok(VersionFamily {
            codename: Codename::from_wire(codename_wire as i32),
            snapshot,
            versions,
        })
    }
}
