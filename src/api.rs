//! PokeAPI client: page-window assembly and the detail fetch chain.
//!
//! Every response embeds the locator for the next dependent fetch; those
//! locators are followed as-is rather than rebuilt from ids, except where the
//! catalog only exposes a species locator and the pokemon record behind it
//! must be addressed by the locator's trailing id (lineage artwork).

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::state::{
    AbilityEntry, DetailBundle, EntitySummary, LineageStage, PageWindow, PokemonDetail,
    SpeciesDetail, StatEntry, DISPLAY_LANGUAGE, PAGE_SIZE,
};

const API_BASE: &str = "https://pokeapi.co/api/v2";
const CATALOG_DEX: &str = "national";
const PAGE_FETCH_CONCURRENCY: usize = 8;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const ARTWORK_POINTER: &str = "/other/official-artwork/front_default";

#[derive(Clone, Debug, Deserialize)]
struct NamedResource {
    name: String,
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct ApiResource {
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct PokedexResponse {
    pokemon_entries: Vec<PokedexEntryResponse>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokedexEntryResponse {
    entry_number: u16,
    pokemon_species: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct SpeciesVarietiesResponse {
    varieties: Vec<VarietySlot>,
}

#[derive(Clone, Debug, Deserialize)]
struct VarietySlot {
    pokemon: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonSummaryResponse {
    id: u16,
    name: String,
    types: Vec<PokemonTypeSlot>,
    sprites: serde_json::Value,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonTypeSlot {
    #[serde(rename = "type")]
    type_info: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonStatSlot {
    base_stat: u16,
    stat: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonAbilitySlot {
    ability: NamedResource,
    is_hidden: bool,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonMoveSlot {
    #[serde(rename = "move")]
    move_info: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    id: u16,
    name: String,
    height: u16,
    weight: u16,
    base_experience: Option<u16>,
    types: Vec<PokemonTypeSlot>,
    stats: Vec<PokemonStatSlot>,
    abilities: Vec<PokemonAbilitySlot>,
    moves: Vec<PokemonMoveSlot>,
    species: NamedResource,
    sprites: serde_json::Value,
}

#[derive(Clone, Debug, Deserialize)]
struct FlavorTextEntry {
    flavor_text: String,
    language: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct GenusEntry {
    genus: String,
    language: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonSpeciesResponse {
    name: String,
    flavor_text_entries: Vec<FlavorTextEntry>,
    genera: Vec<GenusEntry>,
    evolution_chain: Option<ApiResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct EvolutionChainResponse {
    chain: ChainLink,
}

#[derive(Clone, Debug, Deserialize)]
struct ChainLink {
    species: NamedResource,
    evolves_to: Vec<ChainLink>,
}

/// Assemble one page of the catalog: fetch the full index to learn the
/// collection size, slice the window, then resolve every entry through its
/// species locator concurrently. The first failed lookup fails the page.
pub async fn fetch_page_window(page: usize) -> Result<PageWindow, String> {
    let url = format!("{API_BASE}/pokedex/{CATALOG_DEX}");
    let response: PokedexResponse = fetch_json(&url).await?;

    let mut entries = response.pokemon_entries;
    entries.sort_by_key(|entry| entry.entry_number);

    let total_count = entries.len();
    let total_pages = total_page_count(total_count);
    let (start, end) = window_bounds(page, total_count);
    if page == 0 || start >= total_count {
        return Err(format!(
            "page {page} is outside the catalog ({total_pages} pages)"
        ));
    }
    let slice = &entries[start..end];

    let semaphore = Arc::new(Semaphore::new(PAGE_FETCH_CONCURRENCY));
    let mut join_set = JoinSet::new();
    for (slot, entry) in slice.iter().enumerate() {
        let species_url = entry.pokemon_species.url.clone();
        let semaphore = Arc::clone(&semaphore);
        join_set.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| "page fetch semaphore closed".to_string())?;
            let summary = fetch_entry_summary(&species_url).await?;
            Ok::<(usize, EntitySummary), String>((slot, summary))
        });
    }

    let mut slots: Vec<Option<EntitySummary>> = vec![None; slice.len()];
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(Ok((slot, summary))) => slots[slot] = Some(summary),
            Ok(Err(error)) => return Err(error),
            Err(error) => return Err(error.to_string()),
        }
    }

    Ok(PageWindow {
        page,
        total_pages,
        total_count,
        items: slots.into_iter().flatten().collect(),
    })
}

/// Two-stage dependent lookup for one window entry: the species locator
/// yields the default variety's pokemon locator, which yields the summary.
async fn fetch_entry_summary(species_url: &str) -> Result<EntitySummary, String> {
    let species: SpeciesVarietiesResponse = fetch_json(species_url).await?;
    let variety = species
        .varieties
        .into_iter()
        .next()
        .ok_or_else(|| format!("species at {species_url} has no varieties"))?;
    let pokemon: PokemonSummaryResponse = fetch_json(&variety.pokemon.url).await?;
    Ok(EntitySummary {
        id: pokemon.id,
        name: pokemon.name,
        artwork_url: pointer_string(&pokemon.sprites, ARTWORK_POINTER),
        types: pokemon
            .types
            .into_iter()
            .map(|slot| slot.type_info.name)
            .collect(),
    })
}

/// The resolver chain: entity record, then its species record via the
/// embedded locator, then the evolution lineage via the species' locator,
/// then artwork for every flattened lineage stage. Each stage short-circuits
/// the whole operation on failure.
pub async fn fetch_detail_bundle(id: u16) -> Result<DetailBundle, String> {
    let detail = fetch_pokemon_detail(id).await?;
    let species = fetch_species_detail(&detail.species_url).await?;
    let lineage = match species.evolution_chain_url.as_deref() {
        Some(url) => fetch_lineage(url).await?,
        None => Vec::new(),
    };
    Ok(DetailBundle {
        detail,
        species,
        lineage,
    })
}

async fn fetch_pokemon_detail(id: u16) -> Result<PokemonDetail, String> {
    let url = format!("{API_BASE}/pokemon/{id}");
    let response: PokemonResponse = fetch_json(&url).await?;
    Ok(PokemonDetail {
        id: response.id,
        name: response.name,
        artwork_url: pointer_string(&response.sprites, ARTWORK_POINTER),
        types: response
            .types
            .into_iter()
            .map(|slot| slot.type_info.name)
            .collect(),
        abilities: response
            .abilities
            .into_iter()
            .map(|slot| AbilityEntry {
                name: slot.ability.name,
                hidden: slot.is_hidden,
            })
            .collect(),
        stats: response
            .stats
            .into_iter()
            .map(|slot| StatEntry {
                name: slot.stat.name,
                value: slot.base_stat,
            })
            .collect(),
        height: response.height,
        weight: response.weight,
        base_experience: response.base_experience,
        moves: response
            .moves
            .into_iter()
            .map(|slot| slot.move_info.name)
            .collect(),
        species_url: response.species.url,
    })
}

async fn fetch_species_detail(url: &str) -> Result<SpeciesDetail, String> {
    let response: PokemonSpeciesResponse = fetch_json(url).await?;
    let flavor_text = response
        .flavor_text_entries
        .iter()
        .find(|entry| entry.language.name == DISPLAY_LANGUAGE)
        .map(|entry| sanitize_text(&entry.flavor_text));
    let genus = response
        .genera
        .iter()
        .find(|entry| entry.language.name == DISPLAY_LANGUAGE)
        .map(|entry| entry.genus.clone());
    Ok(SpeciesDetail {
        name: response.name,
        flavor_text,
        genus,
        evolution_chain_url: response.evolution_chain.map(|chain| chain.url),
    })
}

async fn fetch_lineage(url: &str) -> Result<Vec<LineageStage>, String> {
    let response: EvolutionChainResponse = fetch_json(url).await?;
    let stages = flatten_chain(&response.chain);
    resolve_stage_artwork(stages).await
}

/// Flatten the lineage tree level by level: root first, then every direct
/// child in document order, then each child's own children in document
/// order. The walk stops at two nesting levels; the catalog has never
/// produced a deeper chain.
fn flatten_chain(chain: &ChainLink) -> Vec<NamedResource> {
    let mut stages = vec![chain.species.clone()];
    for child in &chain.evolves_to {
        stages.push(child.species.clone());
    }
    for child in &chain.evolves_to {
        for grandchild in &child.evolves_to {
            stages.push(grandchild.species.clone());
        }
    }
    stages
}

/// Fetch artwork for every lineage stage concurrently, committing results by
/// slot so the flattened order survives, and failing the whole lineage on
/// the first error.
async fn resolve_stage_artwork(stages: Vec<NamedResource>) -> Result<Vec<LineageStage>, String> {
    let mut join_set = JoinSet::new();
    for (slot, stage) in stages.iter().enumerate() {
        let name = stage.name.clone();
        let species_id = trailing_id(&stage.url)
            .ok_or_else(|| format!("malformed species locator: {}", stage.url))?;
        join_set.spawn(async move {
            let artwork_url = fetch_species_artwork(species_id).await?;
            Ok::<(usize, LineageStage), String>((
                slot,
                LineageStage {
                    species_name: name,
                    artwork_url,
                },
            ))
        });
    }

    let mut slots: Vec<Option<LineageStage>> = vec![None; stages.len()];
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(Ok((slot, stage))) => slots[slot] = Some(stage),
            Ok(Err(error)) => return Err(error),
            Err(error) => return Err(error.to_string()),
        }
    }
    Ok(slots.into_iter().flatten().collect())
}

async fn fetch_species_artwork(species_id: u16) -> Result<Option<String>, String> {
    let url = format!("{API_BASE}/pokemon/{species_id}");
    let response: PokemonSummaryResponse = fetch_json(&url).await?;
    Ok(pointer_string(&response.sprites, ARTWORK_POINTER))
}

/// Number of pages needed to cover `total_count` entries.
pub fn total_page_count(total_count: usize) -> usize {
    (total_count + PAGE_SIZE - 1) / PAGE_SIZE
}

/// Half-open entry range `[start, end)` of a page, clipped to the collection.
pub fn window_bounds(page: usize, total_count: usize) -> (usize, usize) {
    let start = page.saturating_sub(1) * PAGE_SIZE;
    let end = (start + PAGE_SIZE).min(total_count);
    (start.min(total_count), end)
}

fn sanitize_text(text: &str) -> String {
    text.replace('\n', " ").replace('\u{000C}', " ")
}

fn trailing_id(url: &str) -> Option<u16> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
}

fn pointer_string(value: &serde_json::Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}

async fn fetch_json<T: serde::de::DeserializeOwned>(url: &str) -> Result<T, String> {
    let response = http_client()
        .get(url)
        .send()
        .await
        .map_err(|err| err.to_string())?;
    let response = response.error_for_status().map_err(|err| err.to_string())?;
    response.json::<T>().await.map_err(|err| err.to_string())
}

fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client")
    })
}
