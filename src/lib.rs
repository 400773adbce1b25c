// src/lib.rs
//
// Analyseur Q-pur — bibliothèque
// ------------------------------
// Expression infixe -> arbre -> valeur, en arithmétique rationnelle exacte.
//
// Exemple :
//
//     use analyseur_qpur::{Bindings, Fonctions, Parser};
//
//     let p = Parser::new(Fonctions::standard(), &['x'])?;
//     let t = p.parse("3x^2 - 1/3")?;
//     let v = t.evaluate_exact(&Bindings::new().with('x', 2))?;
//     assert_eq!(v.to_string(), "35/3");

pub mod noyau;

pub use noyau::{
    Arity, Bindings, Callable, Error, EvalError, Fonctions, Function, InputError, NamedFunction,
    Node, Number, Operator, Ordered, ParseTree, Parser,
};
