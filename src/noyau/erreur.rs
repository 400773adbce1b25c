//! Erreurs du noyau.
//!
//! Deux familles :
//! - `InputError` : mauvaise configuration ou mauvaise entrée (faute de l’appelant).
//! - `EvalError`  : échec d’une évaluation pour un jeu de valeurs précis ; l’arbre reste valide.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("nom de fonction invalide: '{0}' (lettres ASCII uniquement)")]
    FunctionName(String),
    #[error("symbole invalide: '{0}' (une lettre, sauf 'e')")]
    Symbol(char),
    #[error("nom déjà utilisé: '{0}'")]
    NameCollision(String),
    #[error("jeton invalide: '{0}'")]
    InvalidToken(String),
    #[error("expression vide")]
    Empty,
    #[error("parenthèses non appariées")]
    UnmatchedParenthesis,
    #[error("opérande manquant")]
    MissingOperand,
    #[error("la fonction '{0}' doit être suivie de '('")]
    MissingCall(String),
    #[error("la fonction '{name}' attend {expected} argument(s), reçu {got}")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },
    #[error("jeton inattendu: '{0}'")]
    UnexpectedToken(String),
    #[error("équation invalide: un seul '=' attendu")]
    Equation,
    #[error("valeur non numérique pour '{0}'")]
    NonNumericBinding(char),
    #[error("symbole sans valeur: '{0}'")]
    UnboundSymbol(char),
    #[error("symbole en double dans l’ordre positionnel: '{0}'")]
    DuplicateSymbol(char),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("division par zéro")]
    DivisionByZero,
    #[error("argument hors du domaine de '{0}'")]
    Domain(String),
    #[error("'{0}' n’a pas de forme complexe")]
    NoComplexForm(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Evaluation(#[from] EvalError),
}

impl Error {
    pub fn est_evaluation(&self) -> bool {
        matches!(self, Error::Evaluation(_))
    }
}
