//! # Category — Partições do Espaço de Tags
//!
//! Cada preferência do usuário vive em uma [`Category`]. O conjunto é
//! **fechado** de propósito: o parser, o armazenamento e o filtro fazem
//! `match` exaustivo sobre as categorias, então uma categoria nova obriga
//! o compilador a apontar todos os lugares que precisam tratá-la.
//!
//! | Categoria | Chave no léxico | Política |
//! |-----------|-----------------|----------|
//! | `Cuisine` | `cuisine` | valor único |
//! | `Ingredient` | `ingredient` | valor único |
//! | `MealType` | `category` | valor único |
//! | `Dietary` | `dietary` | multi-valor |
//! | `Dislikes` | `dislikes` | multi-valor |
//! | `Texture` | `texture` | multi-valor (só atributos) |
//!
//! Os [`KnownGroup`]s (`known_meats`, `known_dairy`, `known_gluten`) são
//! famílias de palavras usadas **apenas** pelo filtro dietético, nunca
//! viram pergunta nem entidade.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identificador canônico de um valor de preferência (ex: `"italian"`).
pub type Tag = String;

/// Categoria de preferência exposta ao diálogo e ao parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Cuisine,
    Ingredient,
    /// Tipo de refeição ("Dessert", "Seafood"...). No léxico a chave é `category`.
    #[serde(rename = "category")]
    MealType,
    Dietary,
    Dislikes,
    Texture,
}

impl Category {
    /// Todas as categorias, na ordem usada quando nenhuma prioridade é dada.
    pub const ALL: [Category; 6] = [
        Category::Cuisine,
        Category::Ingredient,
        Category::MealType,
        Category::Dietary,
        Category::Dislikes,
        Category::Texture,
    ];

    /// Categorias que bastam, sozinhas, para uma busca na fonte externa.
    pub const PRIMARY: [Category; 3] = [Category::Cuisine, Category::Ingredient, Category::MealType];

    /// Categorias "positivas": tudo que pode conflitar com `dislikes`.
    pub const POSITIVE: [Category; 5] = [
        Category::Cuisine,
        Category::Ingredient,
        Category::MealType,
        Category::Dietary,
        Category::Texture,
    ];

    /// Chave usada no arquivo de léxico e nas mensagens ao usuário.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Cuisine => "cuisine",
            Category::Ingredient => "ingredient",
            Category::MealType => "category",
            Category::Dietary => "dietary",
            Category::Dislikes => "dislikes",
            Category::Texture => "texture",
        }
    }

    /// Resolve a chave do léxico. Retorna `None` para chaves desconhecidas.
    pub fn from_key(key: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.key() == key)
    }

    /// `true` se a sessão deve manter no máximo um tag nesta categoria.
    ///
    /// Mais de um tag numa categoria de valor único dispara o sub-diálogo
    /// de esclarecimento.
    pub fn is_single_valued(&self) -> bool {
        matches!(self, Category::Cuisine | Category::Ingredient | Category::MealType)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Família de palavras usada só pelo filtro (ex: todas as carnes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KnownGroup {
    Meats,
    Dairy,
    Gluten,
}

impl KnownGroup {
    pub const ALL: [KnownGroup; 3] = [KnownGroup::Meats, KnownGroup::Dairy, KnownGroup::Gluten];

    pub fn key(&self) -> &'static str {
        match self {
            KnownGroup::Meats => "known_meats",
            KnownGroup::Dairy => "known_dairy",
            KnownGroup::Gluten => "known_gluten",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        KnownGroup::ALL.into_iter().find(|g| g.key() == key)
    }
}
