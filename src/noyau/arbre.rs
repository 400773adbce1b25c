//! Arbre d’analyse.
//!
//! Feuilles `Rat` / `Var`, nœuds `Op` portant une `Function` et ses enfants.
//! L’arité est garantie à la construction (parseur) ; l’arbre est immuable
//! ensuite et peut être réévalué avec autant de jeux de valeurs que voulu.

use std::collections::{BTreeMap, BTreeSet};

use num_rational::BigRational;

use super::erreur::InputError;
use super::fonction::Function;
use super::nombre::Number;

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Rat(BigRational),
    Var(char),
    Op {
        fonction: Function,
        enfants: Vec<Node>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParseTree {
    racine: Node,
}

impl ParseTree {
    pub(crate) fn new(racine: Node) -> Self {
        Self { racine }
    }

    pub fn racine(&self) -> &Node {
        &self.racine
    }

    /// Symboles présents dans l’arbre.
    /// Parcours itératif (pile explicite) : pas de récursion sur les arbres profonds.
    pub fn symbols(&self) -> BTreeSet<char> {
        let mut out = BTreeSet::new();
        let mut pile: Vec<&Node> = Vec::with_capacity(64);
        pile.push(&self.racine);

        while let Some(n) = pile.pop() {
            match n {
                Node::Var(c) => {
                    out.insert(*c);
                }
                Node::Rat(_) => {}
                Node::Op { enfants, .. } => pile.extend(enfants.iter()),
            }
        }
        out
    }

    /// Fixe une fois pour toutes l’ordre positionnel des symboles (chemin rapide).
    ///
    /// L’ordre doit couvrir tous les symboles de l’arbre, sans doublon ;
    /// il peut en contenir d’autres.
    pub fn ordered(&self, ordre: &[char]) -> Result<Ordered<'_>, InputError> {
        let mut positions = [None; 128];
        for (i, &c) in ordre.iter().enumerate() {
            if ordre[..i].contains(&c) {
                return Err(InputError::DuplicateSymbol(c));
            }
            if c.is_ascii() {
                positions[c as usize] = Some(i);
            }
        }
        if let Some(c) = self.symbols().into_iter().find(|c| !ordre.contains(c)) {
            return Err(InputError::UnboundSymbol(c));
        }

        Ok(Ordered {
            arbre: self,
            positions,
            taille: ordre.len(),
        })
    }
}

/// Arbre + ordre positionnel des symboles, pour `evaluate_fast`.
#[derive(Clone, Debug)]
pub struct Ordered<'a> {
    pub(crate) arbre: &'a ParseTree,
    pub(crate) positions: [Option<usize>; 128],
    taille: usize,
}

impl Ordered<'_> {
    /// Nombre de valeurs attendues par `evaluate_fast`.
    pub fn len(&self) -> usize {
        self.taille
    }

    pub fn is_empty(&self) -> bool {
        self.taille == 0
    }
}

/* ------------------------ Valeurs des symboles ------------------------ */

/// Jeu de valeurs symbole -> nombre.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bindings {
    valeurs: BTreeMap<char, Number>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, symbole: char, valeur: impl Into<Number>) {
        self.valeurs.insert(symbole, valeur.into());
    }

    pub fn with(mut self, symbole: char, valeur: impl Into<Number>) -> Self {
        self.set(symbole, valeur);
        self
    }

    pub fn get(&self, symbole: char) -> Option<&Number> {
        self.valeurs.get(&symbole)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &Number)> {
        self.valeurs.iter().map(|(c, v)| (*c, v))
    }

    pub fn len(&self) -> usize {
        self.valeurs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valeurs.is_empty()
    }
}

impl<N: Into<Number>> FromIterator<(char, N)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (char, N)>>(iter: I) -> Self {
        let mut b = Bindings::new();
        for (c, v) in iter {
            b.set(c, v);
        }
        b
    }
}
