//! Per-cubemap data supplied by the map file.

use regen_vtf::AmbientTable;

/// One `env_cubemap` as a compiled map records it.
///
/// The map's cubemap lump gives the origin; its ambient lump gives the
/// reciprocal ambient scalar carried by the texture's CMA resource.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CubemapProbe {
    pub origin: [f32; 3],
    pub ambient_rcp: f32,
}

impl CubemapProbe {
    pub fn new(origin: [f32; 3], ambient_rcp: f32) -> Self {
        Self {
            origin,
            ambient_rcp,
        }
    }

    /// File stem the engine derives from the origin, `c{x}_{y}_{z}`.
    pub fn file_stem(&self) -> String {
        let [x, y, z] = self.origin.map(|v| v as i32);
        format!("c{x}_{y}_{z}")
    }
}

/// Ambient table for a set of probes, in probe order.
pub fn ambient_table(probes: &[CubemapProbe]) -> AmbientTable {
    AmbientTable::new(probes.iter().map(|p| p.ambient_rcp).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_truncates() {
        let probe = CubemapProbe::new([128.9, -64.5, 0.2], 1.0);
        assert_eq!(probe.file_stem(), "c128_-64_0");
    }

    #[test]
    fn test_ambient_table_keeps_order() {
        let probes = [
            CubemapProbe::new([0.0; 3], 0.5),
            CubemapProbe::new([1.0; 3], 2.0),
            CubemapProbe::new([2.0; 3], 1.0),
        ];
        assert_eq!(ambient_table(&probes).values, vec![0.5, 2.0, 1.0]);
    }
}
