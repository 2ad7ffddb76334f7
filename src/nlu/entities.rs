//! Entidades extraídas de uma resposta: um conjunto de tags por categoria,
//! mais `negated` e `attributes`.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::core::{Category, Tag};

/// Registro de forma fixa com tudo que o parser reconheceu.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Entities {
    pub cuisine: BTreeSet<Tag>,
    pub ingredient: BTreeSet<Tag>,
    pub meal_type: BTreeSet<Tag>,
    pub dietary: BTreeSet<Tag>,
    pub dislikes: BTreeSet<Tag>,
    pub texture: BTreeSet<Tag>,
    /// Tags explicitamente rejeitados ("no", "not", "without"...).
    pub negated: BTreeSet<Tag>,
    /// tag de ingrediente → tags de textura que o modificam.
    pub attributes: BTreeMap<Tag, BTreeSet<Tag>>,
}

impl Entities {
    pub fn get(&self, category: Category) -> &BTreeSet<Tag> {
        match category {
            Category::Cuisine => &self.cuisine,
            Category::Ingredient => &self.ingredient,
            Category::MealType => &self.meal_type,
            Category::Dietary => &self.dietary,
            Category::Dislikes => &self.dislikes,
            Category::Texture => &self.texture,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut BTreeSet<Tag> {
        match category {
            Category::Cuisine => &mut self.cuisine,
            Category::Ingredient => &mut self.ingredient,
            Category::MealType => &mut self.meal_type,
            Category::Dietary => &mut self.dietary,
            Category::Dislikes => &mut self.dislikes,
            Category::Texture => &mut self.texture,
        }
    }

    /// Categorias positivas com ao menos um tag, em ordem.
    pub fn positive(&self) -> impl Iterator<Item = (Category, &BTreeSet<Tag>)> {
        Category::POSITIVE
            .into_iter()
            .map(|c| (c, self.get(c)))
            .filter(|(_, tags)| !tags.is_empty())
    }

    /// Tudo que uma resposta de rejeição deve marcar como dislike:
    /// `negated`, `dislikes` e qualquer tag positivo mencionado junto.
    pub fn rejected(&self) -> BTreeSet<Tag> {
        let mut all: BTreeSet<Tag> = self.negated.union(&self.dislikes).cloned().collect();
        for (_, tags) in self.positive() {
            all.extend(tags.iter().cloned());
        }
        all
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.get(*c).is_empty())
            && self.negated.is_empty()
            && self.attributes.is_empty()
    }
}
