//! Run configuration.
//!
//! Parameters are read from a JSON object with camelCase keys. Every key is optional and falls
//! back to the defaults of [`Parameters::default`]:
//!
//! ```json
//! {
//!     "graphType": "watts",
//!     "nodes": 200,
//!     "structuralParams": { "k": 6, "beta": 0.1 },
//!     "duration": 60,
//!     "infected": 5,
//!     "transmissionRate": 0.2,
//!     "recoveryRate": 0.5,
//!     "recoveryDays": 5,
//!     "radius": 2.5
//! }
//! ```
//!
//! Missing structural parameters take the defaults of the chosen graph type. `edges` is accepted
//! and ignored.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::trace;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::disease::DiseaseModel;
use crate::error::EpiError;
use crate::network::NetworkModel;

#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GraphType {
    #[default]
    Erdos,
    Watts,
    Barabasi,
    Community,
}

impl GraphType {
    /// The network model used when no structural parameters are given.
    #[must_use]
    pub fn default_model(self) -> NetworkModel {
        match self {
            GraphType::Erdos => NetworkModel::DEFAULT_ERDOS_RENYI,
            GraphType::Watts => NetworkModel::DEFAULT_WATTS_STROGATZ,
            GraphType::Barabasi => NetworkModel::DEFAULT_BARABASI_ALBERT,
            GraphType::Community => NetworkModel::DEFAULT_COMMUNITY,
        }
    }
}

/// Structural overrides. Keys that do not apply to the chosen graph type are ignored.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub m: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communities: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_in: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_out: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Parameters {
    pub graph_type: GraphType,
    pub nodes: usize,
    /// Accepted for compatibility, never used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edges: Option<usize>,
    pub structural_params: StructuralParams,
    /// Advisory length of the run in days. The simulation itself runs until no one is Infected
    /// or Critical.
    pub duration: u32,
    pub infected: usize,
    pub transmission_rate: f64,
    pub recovery_rate: f64,
    pub recovery_days: u32,
    /// Rendering-only node radius.
    pub radius: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            graph_type: GraphType::Erdos,
            nodes: 100,
            edges: None,
            structural_params: StructuralParams::default(),
            duration: 60,
            infected: 5,
            transmission_rate: 0.2,
            recovery_rate: 0.5,
            recovery_days: 5,
            radius: 2.5,
        }
    }
}

impl Parameters {
    /// Resolves the graph type and structural overrides to a concrete model.
    #[must_use]
    pub fn network_model(&self) -> NetworkModel {
        let params = &self.structural_params;
        match self.graph_type.default_model() {
            NetworkModel::ErdosRenyi { p } => NetworkModel::ErdosRenyi {
                p: params.p.unwrap_or(p),
            },
            NetworkModel::WattsStrogatz { k, beta } => NetworkModel::WattsStrogatz {
                k: params.k.unwrap_or(k),
                beta: params.beta.unwrap_or(beta),
            },
            NetworkModel::BarabasiAlbert { m } => NetworkModel::BarabasiAlbert {
                m: params.m.unwrap_or(m),
            },
            NetworkModel::Community {
                communities,
                p_in,
                p_out,
            } => NetworkModel::Community {
                communities: params.communities.unwrap_or(communities),
                p_in: params.p_in.unwrap_or(p_in),
                p_out: params.p_out.unwrap_or(p_out),
            },
        }
    }

    #[must_use]
    pub fn disease_model(&self) -> DiseaseModel {
        DiseaseModel {
            transmission_rate: self.transmission_rate,
            recovery_rate: self.recovery_rate,
            recovery_days: self.recovery_days,
        }
    }

    /// # Errors
    /// Returns `EpiError::InvalidParameter` for the first value out of its domain, including the
    /// structural parameters of the resolved network model.
    pub fn validate(&self) -> Result<(), EpiError> {
        if self.nodes < 1 {
            return Err(EpiError::invalid("nodes must be at least 1"));
        }
        if self.infected > self.nodes {
            return Err(EpiError::invalid(format!(
                "infected ({}) cannot exceed nodes ({})",
                self.infected, self.nodes
            )));
        }
        self.disease_model().validate()?;
        if self.radius.is_nan() || self.radius <= 0.0 {
            return Err(EpiError::invalid(format!(
                "radius must be positive, got {}",
                self.radius
            )));
        }
        self.network_model().validate(self.nodes)
    }

    /// Parses and validates parameters from a JSON string.
    ///
    /// # Errors
    /// Returns `EpiError::JsonError` on malformed input and `EpiError::InvalidParameter` if
    /// validation fails.
    pub fn from_json_str(json: &str) -> Result<Parameters, EpiError> {
        let parameters: Parameters = serde_json::from_str(json)?;
        parameters.validate()?;
        Ok(parameters)
    }
}

/// Loads and validates parameters from a JSON file.
///
/// # Errors
/// Returns `EpiError::IoError` if the file cannot be opened, `EpiError::JsonError` if it is not a
/// valid parameter object and `EpiError::InvalidParameter` if validation fails.
pub fn load_parameters_from_json<P: AsRef<Path>>(path: P) -> Result<Parameters, EpiError> {
    let path = path.as_ref();
    trace!("loading parameters from {}", path.display());
    let reader = BufReader::new(File::open(path)?);
    let parameters: Parameters = serde_json::from_reader(reader)?;
    parameters.validate()?;
    Ok(parameters)
}
