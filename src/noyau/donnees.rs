// src/noyau/donnees.rs
//
// Tables statiques consommées par le noyau : opérateurs, précédences,
// constantes, alphabet des symboles.

use num_rational::BigRational;

use super::nombre::rationnel_decimal;

/// Précédence de base des fonctions préfixées (fonctions nommées + négation).
pub const PRECEDENCE_PREFIXE: u32 = 5;

/// Poids d’un niveau de parenthèses : strictement au-dessus de toute précédence de base.
pub const POIDS_PARENTHESE: u32 = PRECEDENCE_PREFIXE + 1;

/// Le moins unaire absorbe les opérateurs de précédence strictement supérieure
/// (donc `^`) et s’arrête au premier opérateur de précédence <= à ce seuil.
pub const LIAISON_MOINS_UNAIRE: u32 = 3;

/// Symboles autorisés : une lettre ASCII, sauf `e` (réservée à la constante).
pub fn est_symbole_valide(c: char) -> bool {
    c.is_ascii_alphabetic() && c != 'e'
}

/// Constantes nommées (meilleure approximation rationnelle de la valeur flottante).
pub const NOMS_CONSTANTES: [&str; 2] = ["pi", "e"];

pub fn constante(nom: &str) -> Option<BigRational> {
    let v = match nom {
        "pi" => std::f64::consts::PI,
        "e" => std::f64::consts::E,
        _ => return None,
    };
    rationnel_decimal(v)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Associativite {
    Gauche,
    Droite,
}

/// Opérateurs intégrés (variantes fixes de la table de fonctions).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Neg,
}

impl Operator {
    /// Opérateur binaire associé à un caractère.
    pub fn depuis_char(c: char) -> Option<Operator> {
        Some(match c {
            '+' => Operator::Add,
            '-' => Operator::Sub,
            '*' => Operator::Mul,
            '/' => Operator::Div,
            '%' => Operator::Mod,
            '^' => Operator::Pow,
            _ => return None,
        })
    }

    pub fn symbole(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub | Operator::Neg => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Pow => "^",
        }
    }

    pub fn precedence(self) -> u32 {
        match self {
            Operator::Add | Operator::Sub => 1,
            Operator::Mul | Operator::Div | Operator::Mod => 2,
            Operator::Pow => 4,
            Operator::Neg => PRECEDENCE_PREFIXE,
        }
    }

    pub fn associativite(self) -> Associativite {
        match self {
            Operator::Pow | Operator::Neg => Associativite::Droite,
            _ => Associativite::Gauche,
        }
    }

    pub fn arite(self) -> usize {
        match self {
            Operator::Neg => 1,
            _ => 2,
        }
    }
}
