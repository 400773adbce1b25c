// src/noyau/lexer.rs
//
// Normalisation lexicale : chaîne brute -> lexèmes non ambigus.
//
// Étapes :
// 1) espaces supprimés ;
// 2) signes repliés ("+-" -> "-", "--" -> "+") jusqu’à stabilité ;
// 3) multiplication implicite : un '*' marqué `implicite` est inséré avant un nom
//    ou une '(' qui suit une valeur (nombre, symbole, constante, ')') ;
// 4) noms multi-lettres : dans une suite de lettres, on prend d’abord le nom connu
//    le plus long (égalité : ordre lexicographique), sinon un symbole d’une lettre ;
// 5) moins unaire : drapeau `unaire` sur le '-' qui n’a pas d’opérande gauche
//    (début, après un opérateur, '(' ou ','). Un '+' à cette place est ignoré.

use std::cmp::Reverse;
use std::fmt;

use super::donnees::{Operator, NOMS_CONSTANTES};
use super::erreur::InputError;
use super::fonction::Fonctions;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lexeme {
    Nombre(String),
    Fonction(String),
    Constante(String),
    Symbole(char),
    Operateur {
        op: Operator,
        unaire: bool,
        implicite: bool,
    },
    Ouvrante,
    Fermante,
    Virgule,
}

impl Lexeme {
    /// Lexème qui termine une valeur (un opérande gauche possible).
    fn termine_valeur(&self) -> bool {
        matches!(
            self,
            Lexeme::Nombre(_) | Lexeme::Constante(_) | Lexeme::Symbole(_) | Lexeme::Fermante
        )
    }

    /// Lexème devant lequel une multiplication implicite est insérée.
    fn ouvre_valeur(&self) -> bool {
        matches!(
            self,
            Lexeme::Fonction(_) | Lexeme::Constante(_) | Lexeme::Symbole(_) | Lexeme::Ouvrante
        )
    }
}

impl fmt::Display for Lexeme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lexeme::Nombre(s) | Lexeme::Fonction(s) | Lexeme::Constante(s) => f.write_str(s),
            Lexeme::Symbole(c) => write!(f, "{c}"),
            Lexeme::Operateur { op, .. } => f.write_str(op.symbole()),
            Lexeme::Ouvrante => f.write_str("("),
            Lexeme::Fermante => f.write_str(")"),
            Lexeme::Virgule => f.write_str(","),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Genre {
    Fonction,
    Constante,
}

/// Vocabulaire dérivé du registre : noms multi-lettres + symboles d’une lettre.
#[derive(Clone, Debug, Default)]
pub struct Vocabulaire {
    noms: Vec<(String, Genre)>,
    symboles: Vec<char>,
}

impl Vocabulaire {
    pub fn new(fonctions: &Fonctions, symboles: &[char]) -> Self {
        let mut noms: Vec<(String, Genre)> = fonctions
            .names()
            .map(|n| (n.to_string(), Genre::Fonction))
            .chain(
                NOMS_CONSTANTES
                    .iter()
                    .map(|n| (n.to_string(), Genre::Constante)),
            )
            .collect();
        noms.sort_by(|(a, _), (b, _)| (Reverse(a.len()), a).cmp(&(Reverse(b.len()), b)));

        Self {
            noms,
            symboles: symboles.to_vec(),
        }
    }

    /// Reconnaît le lexème qui commence une suite de lettres ; renvoie aussi sa longueur.
    fn reconnaitre(&self, lettres: &[char]) -> Result<(Lexeme, usize), InputError> {
        for (nom, genre) in &self.noms {
            let n = nom.chars().count();
            if lettres.len() >= n && lettres[..n].iter().copied().eq(nom.chars()) {
                let lex = match genre {
                    Genre::Fonction => Lexeme::Fonction(nom.clone()),
                    Genre::Constante => Lexeme::Constante(nom.clone()),
                };
                return Ok((lex, n));
            }
        }

        let c = lettres[0];
        if self.symboles.contains(&c) {
            return Ok((Lexeme::Symbole(c), 1));
        }
        let fin = lettres.iter().take_while(|c| c.is_ascii_alphabetic()).count();
        Err(InputError::InvalidToken(lettres[..fin].iter().collect()))
    }
}

/// Étapes 1 et 2 : espaces + repli des signes.
pub fn nettoyer(texte: &str) -> String {
    let mut s: String = texte.chars().filter(|c| !c.is_whitespace()).collect();
    loop {
        let t = s.replace("+-", "-").replace("--", "+");
        if t == s {
            return s;
        }
        s = t;
    }
}

/// Étapes 3 à 5 sur un texte déjà nettoyé.
pub fn lex(texte: &str, vocab: &Vocabulaire) -> Result<Vec<Lexeme>, InputError> {
    let chars: Vec<char> = texte.chars().collect();
    let mut out: Vec<Lexeme> = Vec::with_capacity(chars.len());
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];

        // Nombre décimal : validé plus tard (un seul point)
        if c.is_ascii_digit() || c == '.' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            pousser(&mut out, Lexeme::Nombre(chars[start..i].iter().collect()))?;
            continue;
        }

        if c.is_ascii_alphabetic() {
            let (lexeme, longueur) = vocab.reconnaitre(&chars[i..])?;
            pousser(&mut out, lexeme)?;
            i += longueur;
            continue;
        }

        match c {
            '(' => pousser(&mut out, Lexeme::Ouvrante)?,
            ')' => pousser(&mut out, Lexeme::Fermante)?,
            ',' => pousser(&mut out, Lexeme::Virgule)?,
            _ => {
                let op = Operator::depuis_char(c)
                    .ok_or_else(|| InputError::InvalidToken(c.to_string()))?;
                let sans_gauche = matches!(
                    out.last(),
                    None | Some(Lexeme::Operateur { .. })
                        | Some(Lexeme::Ouvrante)
                        | Some(Lexeme::Virgule)
                );
                // plus unaire : sans effet
                if !(sans_gauche && op == Operator::Add) {
                    pousser(
                        &mut out,
                        Lexeme::Operateur {
                            op,
                            unaire: sans_gauche && op == Operator::Sub,
                            implicite: false,
                        },
                    )?;
                }
            }
        }
        i += 1;
    }

    if let Some(Lexeme::Fonction(nom)) = out.last() {
        return Err(InputError::MissingCall(nom.clone()));
    }
    Ok(out)
}

fn pousser(out: &mut Vec<Lexeme>, lexeme: Lexeme) -> Result<(), InputError> {
    match out.last() {
        Some(Lexeme::Fonction(nom)) if lexeme != Lexeme::Ouvrante => {
            return Err(InputError::MissingCall(nom.clone()));
        }
        Some(prev) if prev.termine_valeur() => {
            if let Lexeme::Nombre(n) = &lexeme {
                // "x2", ")3" : pas de multiplication implicite devant un nombre
                return Err(InputError::InvalidToken(format!("{prev}{n}")));
            }
            if lexeme.ouvre_valeur() {
                out.push(Lexeme::Operateur {
                    op: Operator::Mul,
                    unaire: false,
                    implicite: true,
                });
            }
        }
        _ => {}
    }
    out.push(lexeme);
    Ok(())
}
