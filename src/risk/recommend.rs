//! Ranking and selection of mitigation actions.
//!
//! Raw score-based ranking alone surfaces only high-effort, high-impact
//! interventions; the diversity rules cap high-effort picks and guarantee a
//! minimum of low-effort ones so the recommended set stays actionable in the
//! near term.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::risk::domain::{Criticality, Hazard};

const MAX_ACTIONS: usize = 10;
const MAX_HIGH_EFFORT: usize = 3;
const MIN_LOW_EFFORT: usize = 2;
const TOP_HAZARD_COUNT: usize = 2;
const HAZARD_SCORE_FACTOR: f64 = 0.6;
const BASEMENT_FLOOD_BONUS: f64 = 8.0;

/// Implementation effort tier of a catalog action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Low,
    Med,
    High,
    #[serde(other)]
    Other,
}

impl Effort {
    fn weight(&self) -> f64 {
        match self {
            Effort::Low => 18.0,
            Effort::Med => 8.0,
            Effort::High => 2.0,
            Effort::Other => 5.0,
        }
    }
}

/// Expected impact tier of a catalog action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Med,
    High,
    #[serde(other)]
    Other,
}

impl Impact {
    fn weight(&self) -> f64 {
        match self {
            Impact::High => 15.0,
            Impact::Med => 8.0,
            Impact::Low => 2.0,
            Impact::Other => 5.0,
        }
    }
}

/// Time horizon over which the action should be engaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Horizon {
    #[serde(rename = "now")]
    Now,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "12m")]
    TwelveMonths,
    #[serde(other, rename = "other")]
    Other,
}

impl Horizon {
    fn weight(&self) -> f64 {
        match self {
            Horizon::Now => 12.0,
            Horizon::ThreeMonths => 6.0,
            Horizon::TwelveMonths => 2.0,
            Horizon::Other => 4.0,
        }
    }
}

/// Catalog entry for one candidate mitigation action. Read-only here; the
/// lifecycle belongs to the catalog collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub title: String,
    pub description: String,
    /// Hazards this action mitigates; empty applies to all.
    pub hazard_tags: Vec<Hazard>,
    /// Sectors this action applies to; empty applies to all.
    pub sector_tags: Vec<String>,
    pub effort: Effort,
    pub cost: String,
    pub impact: Impact,
    pub horizon: Horizon,
    pub prerequisites: Option<String>,
    pub active: bool,
}

/// Presentation snapshot of a chosen action plus its computed priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAction {
    pub title: String,
    pub description: String,
    pub hazard_tags: Vec<Hazard>,
    pub sector_tags: Vec<String>,
    pub effort: Effort,
    pub cost: String,
    pub impact: Impact,
    pub horizon: Horizon,
    pub prerequisites: Option<String>,
    pub priority_score: f64,
}

impl RankedAction {
    fn snapshot(action: &Action, priority: f64) -> Self {
        Self {
            title: action.title.clone(),
            description: action.description.clone(),
            hazard_tags: action.hazard_tags.clone(),
            sector_tags: action.sector_tags.clone(),
            effort: action.effort,
            cost: action.cost.clone(),
            impact: action.impact,
            horizon: action.horizon,
            prerequisites: action.prerequisites.clone(),
            priority_score: (priority * 100.0).round() / 100.0,
        }
    }
}

/// Read access to the action catalog collaborator.
pub trait ActionCatalog: Send + Sync {
    fn active_actions(&self) -> Result<Vec<Action>, CatalogError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalogue d'actions indisponible: {0}")]
    Unavailable(String),
}

/// In-memory catalog, used for tests and for the seeded deployment.
pub struct InMemoryActionCatalog {
    actions: Vec<Action>,
}

impl InMemoryActionCatalog {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    /// Default seeded catalog.
    pub fn seeded() -> Self {
        Self::new(seed_actions())
    }
}

impl ActionCatalog for InMemoryActionCatalog {
    fn active_actions(&self) -> Result<Vec<Action>, CatalogError> {
        Ok(self
            .actions
            .iter()
            .filter(|action| action.active)
            .cloned()
            .collect())
    }
}

struct RankedCandidate {
    index: usize,
    priority: f64,
}

pub struct RecommendationEngine<C> {
    catalog: C,
}

impl<C: ActionCatalog> RecommendationEngine<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// Rank and select at most ten actions for the site. `building_type` is
    /// accepted for forward compatibility but does not influence ranking.
    pub fn build_top_actions(
        &self,
        scores: &BTreeMap<Hazard, u8>,
        sector: Option<&str>,
        _building_type: Option<&str>,
        has_basement: bool,
        criticality: Criticality,
    ) -> Result<Vec<RankedAction>, CatalogError> {
        let actions = self.catalog.active_actions()?;
        let top_hazards = top_hazards(scores, TOP_HAZARD_COUNT);
        let boost = criticality.multiplier();

        let mut ranked: Vec<RankedCandidate> = actions
            .iter()
            .enumerate()
            .filter(|(_, action)| matches_sector(action, sector))
            .filter(|(_, action)| matches_hazards(action, &top_hazards))
            .map(|(index, action)| RankedCandidate {
                index,
                priority: score_action(action, scores, boost, has_basement),
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.priority
                .partial_cmp(&a.priority)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.index.cmp(&b.index))
        });

        let selected = apply_diversity_rules(&ranked, &actions);

        Ok(selected
            .into_iter()
            .map(|candidate| RankedAction::snapshot(&actions[candidate.index], candidate.priority))
            .collect())
    }
}

/// Top hazards by score descending; ties break on hazard identifier lexical
/// order so the output is reproducible.
fn top_hazards(scores: &BTreeMap<Hazard, u8>, limit: usize) -> Vec<Hazard> {
    let mut entries: Vec<(Hazard, u8)> = scores.iter().map(|(h, s)| (*h, *s)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    entries.into_iter().take(limit).map(|(h, _)| h).collect()
}

fn matches_sector(action: &Action, sector: Option<&str>) -> bool {
    let Some(sector) = sector else {
        return true;
    };
    action.sector_tags.is_empty() || action.sector_tags.iter().any(|tag| tag == sector)
}

fn matches_hazards(action: &Action, top: &[Hazard]) -> bool {
    action.hazard_tags.is_empty() || action.hazard_tags.iter().any(|tag| top.contains(tag))
}

fn score_action(
    action: &Action,
    scores: &BTreeMap<Hazard, u8>,
    criticality_boost: f64,
    has_basement: bool,
) -> f64 {
    let mut priority: f64 = action
        .hazard_tags
        .iter()
        .map(|hazard| f64::from(scores.get(hazard).copied().unwrap_or(0)) * HAZARD_SCORE_FACTOR)
        .sum();

    priority += action.effort.weight();
    priority += action.impact.weight();
    priority += action.horizon.weight();
    priority *= criticality_boost;

    if has_basement && action.hazard_tags.contains(&Hazard::Flood) {
        priority += BASEMENT_FLOOD_BONUS;
    }

    priority
}

/// Walk the ranked list capping high-effort picks at three and the total at
/// ten, then backfill from the tail until two low-effort actions are present
/// or no unselected low-effort candidate remains.
fn apply_diversity_rules<'a>(
    ranked: &'a [RankedCandidate],
    actions: &[Action],
) -> Vec<&'a RankedCandidate> {
    let mut selected: Vec<&RankedCandidate> = Vec::new();
    let mut high_effort = 0_usize;
    let mut low_effort = 0_usize;

    for candidate in ranked {
        let effort = actions[candidate.index].effort;
        if effort == Effort::High && high_effort >= MAX_HIGH_EFFORT {
            continue;
        }

        selected.push(candidate);
        match effort {
            Effort::High => high_effort += 1,
            Effort::Low => low_effort += 1,
            _ => {}
        }

        if selected.len() >= MAX_ACTIONS {
            break;
        }
    }

    if low_effort < MIN_LOW_EFFORT {
        inject_low_effort(&mut selected, ranked, actions, MIN_LOW_EFFORT - low_effort);
    }

    selected
}

/// Replace the lowest-priority non-low-effort selected action with the next
/// unselected low-effort candidate, one swap per candidate, in original rank
/// order. Evicting only non-low entries keeps earlier injections in place
/// when more than one swap is needed.
fn inject_low_effort<'a>(
    selected: &mut Vec<&'a RankedCandidate>,
    ranked: &'a [RankedCandidate],
    actions: &[Action],
    mut needed: usize,
) {
    for candidate in ranked {
        if needed == 0 {
            break;
        }
        if actions[candidate.index].effort != Effort::Low {
            continue;
        }
        if selected.iter().any(|c| c.index == candidate.index) {
            continue;
        }

        // evict only when there is no room left
        if selected.len() >= MAX_ACTIONS {
            match selected
                .iter()
                .rposition(|c| actions[c.index].effort != Effort::Low)
            {
                Some(position) => {
                    selected.remove(position);
                }
                None => break,
            }
        }
        selected.push(candidate);
        needed -= 1;
    }
}

/// Seed catalog of mitigation actions for the demo deployment.
pub fn seed_actions() -> Vec<Action> {
    fn action(
        title: &str,
        description: &str,
        hazard_tags: &[Hazard],
        sector_tags: &[&str],
        effort: Effort,
        cost: &str,
        impact: Impact,
        horizon: Horizon,
        prerequisites: Option<&str>,
    ) -> Action {
        Action {
            title: title.to_string(),
            description: description.to_string(),
            hazard_tags: hazard_tags.to_vec(),
            sector_tags: sector_tags.iter().map(|s| s.to_string()).collect(),
            effort,
            cost: cost.to_string(),
            impact,
            horizon,
            prerequisites: prerequisites.map(str::to_string),
            active: true,
        }
    }

    vec![
        action(
            "Plan canicule et communication interne",
            "Mettre en place un protocole chaleur et informer les équipes.",
            &[Hazard::Heat],
            &[],
            Effort::Low,
            "€",
            Impact::Med,
            Horizon::Now,
            None,
        ),
        action(
            "Vérifications HVAC et filtration",
            "Vérifier l'entretien des systèmes de ventilation et la qualité de l'air.",
            &[Hazard::Heat],
            &["tertiaire", "industrie", "collectivite"],
            Effort::Med,
            "€€",
            Impact::Med,
            Horizon::ThreeMonths,
            None,
        ),
        action(
            "Protections solaires sur vitrages",
            "Installer stores, films ou brise-soleil pour limiter les surchauffes.",
            &[Hazard::Heat],
            &[],
            Effort::Med,
            "€€",
            Impact::High,
            Horizon::TwelveMonths,
            None,
        ),
        action(
            "Optimisation des horaires d'exploitation",
            "Décaler certaines activités aux heures les plus fraîches.",
            &[Hazard::Heat],
            &[],
            Effort::Low,
            "€",
            Impact::Low,
            Horizon::Now,
            None,
        ),
        action(
            "Isolation thermique de la toiture",
            "Réduire durablement la surchauffe estivale du bâtiment.",
            &[Hazard::Heat],
            &[],
            Effort::High,
            "€€€",
            Impact::High,
            Horizon::TwelveMonths,
            Some("Étude thermique préalable"),
        ),
        action(
            "Surélévation des équipements sensibles",
            "Déplacer les équipements critiques hors des zones submersibles.",
            &[Hazard::Flood],
            &[],
            Effort::Med,
            "€€",
            Impact::High,
            Horizon::ThreeMonths,
            None,
        ),
        action(
            "Batardeaux et protections amovibles",
            "Équiper les ouvrants exposés de barrières anti-inondation.",
            &[Hazard::Flood],
            &[],
            Effort::Med,
            "€€",
            Impact::High,
            Horizon::ThreeMonths,
            None,
        ),
        action(
            "Plan d'évacuation et exercice inondation",
            "Formaliser les consignes de crue et entraîner les équipes.",
            &[Hazard::Flood],
            &[],
            Effort::Low,
            "€",
            Impact::Med,
            Horizon::Now,
            None,
        ),
        action(
            "Clapets anti-retour sur réseaux",
            "Empêcher les remontées d'eaux usées vers les sous-sols.",
            &[Hazard::Flood],
            &[],
            Effort::Low,
            "€",
            Impact::Med,
            Horizon::ThreeMonths,
            Some("Accès aux réseaux d'évacuation"),
        ),
        action(
            "Relocalisation du stockage en sous-sol",
            "Remonter archives et stocks sensibles au-dessus du niveau de crue.",
            &[Hazard::Flood],
            &[],
            Effort::High,
            "€€€",
            Impact::High,
            Horizon::TwelveMonths,
            None,
        ),
        action(
            "Suivi des fissures structurelles",
            "Poser des témoins et suivre l'évolution des fissures du bâti.",
            &[Hazard::DroughtClay],
            &[],
            Effort::Low,
            "€",
            Impact::Med,
            Horizon::Now,
            None,
        ),
        action(
            "Étude géotechnique des fondations",
            "Diagnostiquer la sensibilité des fondations au retrait-gonflement.",
            &[Hazard::DroughtClay],
            &[],
            Effort::High,
            "€€€",
            Impact::High,
            Horizon::TwelveMonths,
            None,
        ),
        action(
            "Gestion des eaux pluviales en périphérie",
            "Éloigner les rejets d'eau des fondations pour stabiliser les sols.",
            &[Hazard::DroughtClay],
            &[],
            Effort::Med,
            "€€",
            Impact::Med,
            Horizon::ThreeMonths,
            None,
        ),
        action(
            "Débroussaillement réglementaire",
            "Maintenir les abords dégagés pour limiter la propagation des feux.",
            &[Hazard::Fire],
            &[],
            Effort::Low,
            "€",
            Impact::High,
            Horizon::Now,
            None,
        ),
        action(
            "Moyens d'extinction de première intervention",
            "Vérifier extincteurs, RIA et formation du personnel.",
            &[Hazard::Fire],
            &[],
            Effort::Low,
            "€",
            Impact::Med,
            Horizon::Now,
            None,
        ),
        action(
            "Écran coupe-feu périmétral",
            "Créer une bande incombustible autour des bâtiments exposés.",
            &[Hazard::Fire],
            &[],
            Effort::High,
            "€€€",
            Impact::High,
            Horizon::TwelveMonths,
            None,
        ),
        action(
            "Diagnostic cavité et sondage de sol",
            "Faire sonder le sous-sol avant tout aménagement lourd.",
            &[Hazard::Cavites],
            &[],
            Effort::Med,
            "€€",
            Impact::High,
            Horizon::ThreeMonths,
            None,
        ),
        action(
            "Surveillance des affaissements",
            "Inspecter régulièrement dallages et voiries pour détecter les désordres.",
            &[Hazard::Cavites],
            &[],
            Effort::Low,
            "€",
            Impact::Med,
            Horizon::Now,
            None,
        ),
        action(
            "Plan de continuité d'activité multirisque",
            "Formaliser un PCA couvrant les principaux aléas climatiques du site.",
            &[],
            &[],
            Effort::Med,
            "€€",
            Impact::High,
            Horizon::ThreeMonths,
            None,
        ),
        action(
            "Veille météo et alerte interne",
            "S'abonner aux bulletins de vigilance et relayer les alertes en interne.",
            &[],
            &[],
            Effort::Low,
            "€",
            Impact::Med,
            Horizon::Now,
            None,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores() -> BTreeMap<Hazard, u8> {
        let mut scores = BTreeMap::new();
        scores.insert(Hazard::Heat, 80);
        scores.insert(Hazard::Flood, 30);
        scores.insert(Hazard::DroughtClay, 20);
        scores.insert(Hazard::Fire, 10);
        scores.insert(Hazard::Cavites, 10);
        scores
    }

    fn plain_action(title: &str, hazards: &[Hazard], effort: Effort) -> Action {
        Action {
            title: title.to_string(),
            description: "description".to_string(),
            hazard_tags: hazards.to_vec(),
            sector_tags: Vec::new(),
            effort,
            cost: "€".to_string(),
            impact: Impact::Med,
            horizon: Horizon::Now,
            prerequisites: None,
            active: true,
        }
    }

    fn engine(actions: Vec<Action>) -> RecommendationEngine<InMemoryActionCatalog> {
        RecommendationEngine::new(InMemoryActionCatalog::new(actions))
    }

    #[test]
    fn top_hazards_break_ties_lexically() {
        let mut scores = BTreeMap::new();
        scores.insert(Hazard::Heat, 40);
        scores.insert(Hazard::Fire, 40);
        scores.insert(Hazard::Flood, 40);
        scores.insert(Hazard::Cavites, 10);

        assert_eq!(top_hazards(&scores, 2), vec![Hazard::Fire, Hazard::Flood]);
    }

    #[test]
    fn top_hazards_prefer_higher_scores() {
        assert_eq!(
            top_hazards(&scores(), 2),
            vec![Hazard::Heat, Hazard::Flood]
        );
    }

    #[test]
    fn untagged_actions_are_always_eligible() {
        let actions = vec![plain_action("générique", &[], Effort::Med)];
        let ranked = engine(actions)
            .build_top_actions(&scores(), None, None, false, Criticality::Standard)
            .expect("catalog read");

        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn actions_outside_top_hazards_are_filtered_out() {
        let actions = vec![
            plain_action("chaleur", &[Hazard::Heat], Effort::Med),
            plain_action("cavités", &[Hazard::Cavites], Effort::Med),
        ];
        let ranked = engine(actions)
            .build_top_actions(&scores(), None, None, false, Criticality::Standard)
            .expect("catalog read");

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].title, "chaleur");
    }

    #[test]
    fn wrong_sector_excludes_even_a_top_hazard_action() {
        let mut action = plain_action("chaleur tertiaire", &[Hazard::Heat], Effort::Low);
        action.sector_tags = vec!["tertiaire".to_string()];
        let ranked = engine(vec![action])
            .build_top_actions(&scores(), Some("industrie"), None, false, Criticality::Standard)
            .expect("catalog read");

        assert!(ranked.is_empty());
    }

    #[test]
    fn missing_sector_input_matches_any_tagged_action() {
        let mut action = plain_action("chaleur tertiaire", &[Hazard::Heat], Effort::Low);
        action.sector_tags = vec!["tertiaire".to_string()];
        let ranked = engine(vec![action])
            .build_top_actions(&scores(), None, None, false, Criticality::Standard)
            .expect("catalog read");

        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn inactive_actions_never_surface() {
        let mut action = plain_action("désactivée", &[Hazard::Heat], Effort::Low);
        action.active = false;
        let ranked = engine(vec![action])
            .build_top_actions(&scores(), None, None, false, Criticality::Standard)
            .expect("catalog read");

        assert!(ranked.is_empty());
    }

    #[test]
    fn priority_formula_composes_all_weights() {
        let action = plain_action("chaleur", &[Hazard::Heat], Effort::Low);
        // 0.6*80 + effort 18 + impact 8 + horizon 12 = 86
        let priority = score_action(&action, &scores(), 1.0, false);
        assert!((priority - 86.0).abs() < 1e-9);
    }

    #[test]
    fn criticality_multiplies_before_the_basement_bonus() {
        let action = plain_action("inondation", &[Hazard::Flood], Effort::Low);
        // (0.6*30 + 18 + 8 + 12) * 1.2 + 8 = 67.2 + 8 = 75.2
        let priority = score_action(&action, &scores(), 1.2, true);
        assert!((priority - 75.2).abs() < 1e-9);
    }

    #[test]
    fn basement_bonus_only_applies_to_flood_tagged_actions() {
        let action = plain_action("chaleur", &[Hazard::Heat], Effort::Low);
        let with = score_action(&action, &scores(), 1.0, true);
        let without = score_action(&action, &scores(), 1.0, false);
        assert!((with - without).abs() < 1e-9);
    }

    #[test]
    fn output_is_capped_at_ten() {
        let actions: Vec<Action> = (0..25)
            .map(|i| plain_action(&format!("action {i}"), &[Hazard::Heat], Effort::Med))
            .collect();
        let ranked = engine(actions)
            .build_top_actions(&scores(), None, None, false, Criticality::Standard)
            .expect("catalog read");

        assert_eq!(ranked.len(), MAX_ACTIONS);
    }

    #[test]
    fn at_most_three_high_effort_actions_are_selected() {
        let mut actions: Vec<Action> = (0..8)
            .map(|i| {
                let mut a = plain_action(&format!("lourde {i}"), &[Hazard::Heat], Effort::High);
                a.impact = Impact::High;
                a
            })
            .collect();
        actions.extend((0..6).map(|i| plain_action(&format!("légère {i}"), &[Hazard::Heat], Effort::Low)));

        let ranked = engine(actions)
            .build_top_actions(&scores(), None, None, false, Criticality::Standard)
            .expect("catalog read");

        let high = ranked.iter().filter(|a| a.effort == Effort::High).count();
        assert!(high <= 3, "selected {high} high-effort actions");
    }

    #[test]
    fn backfill_guarantees_two_low_effort_actions() {
        // enough med/high candidates to fill the list before any low-effort
        // action ranks, plus low-effort candidates further down
        let mut actions: Vec<Action> = (0..12)
            .map(|i| {
                let mut a = plain_action(&format!("moyenne {i}"), &[Hazard::Heat], Effort::Med);
                a.impact = Impact::High;
                a
            })
            .collect();
        actions.extend((0..3).map(|i| {
            let mut a = plain_action(&format!("légère {i}"), &[Hazard::Heat], Effort::Low);
            a.impact = Impact::Low;
            a.horizon = Horizon::TwelveMonths;
            a
        }));

        let ranked = engine(actions)
            .build_top_actions(&scores(), None, None, false, Criticality::Standard)
            .expect("catalog read");

        assert_eq!(ranked.len(), MAX_ACTIONS);
        let low = ranked.iter().filter(|a| a.effort == Effort::Low).count();
        assert_eq!(low, MIN_LOW_EFFORT);
        // the two lowest-priority med actions were replaced from the tail
        assert_eq!(ranked[8].effort, Effort::Low);
        assert_eq!(ranked[9].effort, Effort::Low);
    }

    #[test]
    fn second_swap_never_evicts_the_first_injected_action() {
        let mut actions: Vec<Action> = (0..10)
            .map(|i| {
                let mut a = plain_action(&format!("moyenne {i}"), &[Hazard::Heat], Effort::Med);
                a.impact = Impact::High;
                a
            })
            .collect();
        actions.extend((0..2).map(|i| {
            let mut a = plain_action(&format!("légère {i}"), &[Hazard::Heat], Effort::Low);
            a.impact = Impact::Low;
            a.horizon = Horizon::TwelveMonths;
            a
        }));

        let ranked = engine(actions)
            .build_top_actions(&scores(), None, None, false, Criticality::Standard)
            .expect("catalog read");

        let titles: Vec<&str> = ranked
            .iter()
            .filter(|a| a.effort == Effort::Low)
            .map(|a| a.title.as_str())
            .collect();
        assert_eq!(titles, vec!["légère 0", "légère 1"]);
    }

    #[test]
    fn no_backfill_when_no_low_effort_candidates_exist() {
        let actions: Vec<Action> = (0..12)
            .map(|i| plain_action(&format!("moyenne {i}"), &[Hazard::Heat], Effort::Med))
            .collect();
        let ranked = engine(actions)
            .build_top_actions(&scores(), None, None, false, Criticality::Standard)
            .expect("catalog read");

        assert_eq!(ranked.len(), MAX_ACTIONS);
        assert!(ranked.iter().all(|a| a.effort == Effort::Med));
    }

    #[test]
    fn short_candidate_pools_are_returned_whole() {
        let actions = vec![
            plain_action("a", &[Hazard::Heat], Effort::Med),
            plain_action("b", &[Hazard::Heat], Effort::Low),
        ];
        let ranked = engine(actions)
            .build_top_actions(&scores(), None, None, false, Criticality::Standard)
            .expect("catalog read");

        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn priority_is_rounded_to_two_decimals() {
        let mut action = plain_action("inondation", &[Hazard::Flood], Effort::Med);
        action.impact = Impact::Low;
        let ranked = engine(vec![action])
            .build_top_actions(&scores(), None, None, false, Criticality::Medium)
            .expect("catalog read");

        // (0.6*30 + 8 + 2 + 12) * 1.1 = 44.0
        assert_eq!(ranked[0].priority_score, 44.0);
        assert_eq!(
            (ranked[0].priority_score * 100.0).round() / 100.0,
            ranked[0].priority_score
        );
    }

    #[test]
    fn seed_catalog_offers_low_effort_options_for_every_hazard() {
        let actions = seed_actions();
        for hazard in Hazard::ALL {
            assert!(
                actions.iter().any(|a| {
                    a.effort == Effort::Low
                        && (a.hazard_tags.is_empty() || a.hazard_tags.contains(&hazard))
                }),
                "no low-effort action covers {hazard}"
            );
        }
    }

    #[test]
    fn effort_deserializes_unknown_values_to_other() {
        let effort: Effort = serde_json::from_str("\"herculean\"").expect("deserialize");
        assert_eq!(effort, Effort::Other);
        let horizon: Horizon = serde_json::from_str("\"24m\"").expect("deserialize");
        assert_eq!(horizon, Horizon::Other);
    }
}
