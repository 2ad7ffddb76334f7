//! # MealDbClient — Cliente HTTP do TheMealDB
//!
//! ```text
//! search(Area)        → GET filter.php?a=<valor>
//! search(Ingredient)  → GET filter.php?i=<valor>
//! search(Category)    → GET filter.php?c=<valor>
//! detail(id)          → GET lookup.php?i=<id>
//! random()            → GET random.php
//! vocabulary(kind)    → GET list.php?{c|a|i}=list
//! ```
//!
//! Toda resposta tem a forma `{"meals": [...] | null}`; `null` significa
//! lista vazia. HTTP 429 espera [`RATE_LIMIT_BACKOFF`] e tenta **uma** vez
//! mais antes de desistir com [`SourceError::RateLimited`].

use std::collections::BTreeSet;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;

use super::{MealSource, SearchCriteria};
use crate::core::{Ingredient, MealDetail, MealSummary, VocabularyKind};
use crate::error::SourceError;

/// Endpoint público (chave de teste "1").
pub const DEFAULT_BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1/";

pub const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

pub const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(5);

/// Quantos pares `strIngredientN`/`strMeasureN` um registro pode ter.
const MAX_INGREDIENTS: usize = 20;

/// Cliente síncrono do TheMealDB.
pub struct MealDbClient {
    http: Client,
    base_url: String,
    backoff: Duration,
}

impl MealDbClient {
    /// Cria um cliente para `base_url` (a barra final é opcional).
    pub fn new(base_url: impl Into<String>) -> Result<Self, SourceError> {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let http = Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self { http, base_url, backoff: RATE_LIMIT_BACKOFF })
    }

    /// GET `endpoint` e devolve o conteúdo de `"meals"`.
    fn call(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Vec<Value>, SourceError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let mut response = self.http.get(&url).query(params).send()?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!(endpoint, backoff_secs = self.backoff.as_secs(), "Rate limit, aguardando nova tentativa");
            thread::sleep(self.backoff);
            response = self.http.get(&url).query(params).send()?;
            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                return Err(SourceError::RateLimited { endpoint: endpoint.to_string() });
            }
        }

        let body: Value = response.error_for_status()?.json()?;
        let meals = meals_of(&body).map_err(|detail| SourceError::Malformed {
            endpoint: endpoint.to_string(),
            detail,
        })?;
        tracing::debug!(endpoint, count = meals.len(), "Resposta da fonte");
        Ok(meals)
    }
}

impl MealSource for MealDbClient {
    fn search(&self, criteria: &SearchCriteria) -> Result<Vec<MealSummary>, SourceError> {
        let param = match criteria {
            SearchCriteria::Area(_) => "a",
            SearchCriteria::Ingredient(_) => "i",
            SearchCriteria::Category(_) => "c",
        };
        let meals = self.call("filter.php", &[(param, criteria.value())])?;
        Ok(meals.iter().filter_map(parse_summary).collect())
    }

    fn detail(&self, id: &str) -> Result<Option<MealDetail>, SourceError> {
        let meals = self.call("lookup.php", &[("i", id)])?;
        Ok(meals.first().and_then(parse_detail))
    }

    fn random(&self) -> Result<Option<MealDetail>, SourceError> {
        let meals = self.call("random.php", &[])?;
        Ok(meals.first().and_then(parse_detail))
    }

    fn vocabulary(&self, kind: VocabularyKind) -> Result<BTreeSet<String>, SourceError> {
        let (param, field) = match kind {
            VocabularyKind::Categories => ("c", "strCategory"),
            VocabularyKind::Areas => ("a", "strArea"),
            VocabularyKind::Ingredients => ("i", "strIngredient"),
        };
        let meals = self.call("list.php", &[(param, "list")])?;
        Ok(meals
            .iter()
            .filter_map(|m| text_field(m, field))
            .map(|v| v.to_lowercase())
            .collect())
    }
}

/// Extrai a lista de `"meals"`; ausente ou `null` vira lista vazia.
fn meals_of(body: &Value) -> Result<Vec<Value>, String> {
    match body.get("meals") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(other) => Err(format!("\"meals\" deveria ser lista, veio {}", other)),
    }
}

/// Campo de texto não vazio, sem espaços nas bordas.
fn text_field<'v>(value: &'v Value, key: &str) -> Option<&'v str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

pub(crate) fn parse_summary(value: &Value) -> Option<MealSummary> {
    Some(MealSummary {
        id: text_field(value, "idMeal")?.to_string(),
        name: text_field(value, "strMeal").unwrap_or_default().to_string(),
        thumbnail: text_field(value, "strMealThumb").map(str::to_string),
    })
}

pub(crate) fn parse_detail(value: &Value) -> Option<MealDetail> {
    let ingredients = (1..=MAX_INGREDIENTS)
        .filter_map(|n| {
            let name = text_field(value, &format!("strIngredient{}", n))?;
            Some(Ingredient {
                name: name.to_string(),
                measure: text_field(value, &format!("strMeasure{}", n)).map(str::to_string),
            })
        })
        .collect();

    let tags = text_field(value, "strTags")
        .map(|t| {
            t.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let owned = |key: &str| text_field(value, key).unwrap_or_default().to_string();

    Some(MealDetail {
        id: text_field(value, "idMeal")?.to_string(),
        name: owned("strMeal"),
        category: owned("strCategory"),
        area: owned("strArea"),
        tags,
        instructions: owned("strInstructions"),
        ingredients,
        youtube: text_field(value, "strYoutube").map(str::to_string),
        source: text_field(value, "strSource").map(str::to_string),
    })
}
