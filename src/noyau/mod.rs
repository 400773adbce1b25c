//! Noyau exact Q-pur
//!
//! Organisation interne :
//! - donnees.rs  : opérateurs, précédences, constantes, alphabet des symboles
//! - nombre.rs   : Number (rationnel exact ou flottant) + arithmétique
//! - fonction.rs : table de fonctions (trait Callable, opérateurs, fonctions nommées)
//! - lexer.rs    : normalisation lexicale (signes, * implicite, noms, moins unaire)
//! - jetons.rs   : découpage en termes + tokenisation + registre
//! - parseur.rs  : pondération par profondeur + construction récursive
//! - arbre.rs    : arbre d’analyse, valeurs liées, ordre positionnel
//! - eval.rs     : évaluations exacte / complexe / rapide + pipeline de la démo
//! - format.rs   : affichage exact + lecture décimale tronquée

pub mod arbre;
pub mod donnees;
pub mod erreur;
pub mod eval;
pub mod fonction;
pub mod format;
pub mod jetons;
pub mod lexer;
pub mod nombre;
pub mod parseur;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;


// API publique
pub use arbre::{Bindings, Node, Ordered, ParseTree};
pub use donnees::Operator;
pub use erreur::{Error, EvalError, InputError};
pub use eval::{eval_expression, lire_valeurs, DemarcheNoyau, Resultat};
pub use fonction::{Arity, Callable, Fonctions, Function, NamedFunction};
pub use format::{format_rationnel, lecture_decimale};
pub use jetons::{format_tokens, Tok};
pub use nombre::Number;
pub use parseur::Parser;
