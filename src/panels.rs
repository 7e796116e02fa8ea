//! Region sidebar - statistic cards and critical areas
//!
//! Placeholder display data until real satellite products are wired in. Values
//! are static strings from the manifest; the only derived part is which cards
//! relate to the visible layers and the priority ordering of areas.

use crate::layers::{ActiveSelection, LayerId};
use crate::style::Color;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "Prioridade Alta",
            Priority::Medium => "Prioridade Média",
            Priority::Low => "Prioridade Baixa",
        }
    }
}

/// One "Estatísticas da Região" card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatCard {
    pub label: String,
    pub value: String,
    pub layer: LayerId,
    pub color: Color,
}

impl StatCard {
    /// Cards whose layer is on the map are shown emphasized
    pub fn highlighted(&self, selection: &ActiveSelection) -> bool {
        selection.contains(self.layer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalArea {
    pub name: String,
    pub summary: String,
    pub priority: Priority,
    pub accent: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionPanels {
    pub region: String,
    pub stats: Vec<StatCard>,
    pub critical_areas: Vec<CriticalArea>,
}

impl Default for RegionPanels {
    fn default() -> Self {
        let stat = |label: &str, value: &str, layer, color| StatCard {
            label: label.to_string(),
            value: value.to_string(),
            layer,
            color,
        };
        let area = |name: &str, summary: &str, priority, accent| CriticalArea {
            name: name.to_string(),
            summary: summary.to_string(),
            priority,
            accent,
        };

        Self {
            region: "São Paulo, Brasil".to_string(),
            stats: vec![
                stat("Qualidade do Ar", "Moderada", LayerId::Poluicao, Color::rgb(0xca, 0x8a, 0x04)),
                stat("Temperatura Média", "32°C", LayerId::Calor, Color::rgb(0xea, 0x58, 0x0c)),
                stat("Cobertura Verde", "18%", LayerId::Verde, Color::rgb(0x16, 0xa3, 0x4a)),
                stat("População Afetada", "2.4M", LayerId::Pop, Color::rgb(0x25, 0x63, 0xeb)),
            ],
            critical_areas: vec![
                area("Centro - Zona Crítica", "Alta poluição + Ilha de calor", Priority::High, Color::rgb(0xdc, 0x26, 0x26)),
                area("Zona Industrial", "NO₂ elevado, baixo NDVI", Priority::Medium, Color::rgb(0xca, 0x8a, 0x04)),
                area("Bairro Periférico", "Temperatura +5°C acima", Priority::Medium, Color::rgb(0xea, 0x58, 0x0c)),
            ],
        }
    }
}

impl RegionPanels {
    /// Areas with the most urgent first; equal priorities keep manifest order
    pub fn areas_by_priority(&self) -> Vec<&CriticalArea> {
        let mut areas: Vec<&CriticalArea> = self.critical_areas.iter().collect();
        areas.sort_by_key(|a| a.priority);
        areas
    }
}
