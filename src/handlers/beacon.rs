use super::AppState;
use crate::types::{API_VERSION, BEACON_API_VERSION, Beacon, BeaconDataset, BeaconOrganization};
use axum::{Json, extract::State};

const EVA_URL: &str = "https://www.ebi.ac.uk/eva";

pub async fn beacon(State(state): State<AppState>) -> Json<Beacon> {
    Json(Beacon {
        id: "uk.ac.ebi.eva".to_string(),
        name: "European Variation Archive Beacon".to_string(),
        api_version: BEACON_API_VERSION.to_string(),
        organization: BeaconOrganization {
            id: "EMBL-EBI".to_string(),
            name: "European Bioinformatics Institute".to_string(),
            description: Some("European Molecular Biology Laboratory - European Bioinformatics Institute".to_string()),
            welcome_url: "https://www.ebi.ac.uk".to_string(),
        },
        description: Some("Resolves variant identifiers into per-species variant records".to_string()),
        version: API_VERSION.to_string(),
        welcome_url: state.base_url.clone(),
        alternative_url: Some(EVA_URL.to_string()),
        create_date_time: None,
        update_date_time: None,
        datasets: vec![BeaconDataset {
            id: state.docs_species.clone(),
            name: format!("EVA variants for {}", state.docs_species),
        }],
    })
}
