// src/noyau/jetons.rs
//
// Tokenisation : lexèmes -> jetons typés.
//
// - Le registre (fonctions + symboles) vit ici ; chaque modification revalide
//   et reconstruit le vocabulaire utilisé par le lexer.
// - Découpage en termes aux '+'/'-' binaires de profondeur 0, puis classement
//   terme par terme ; les séparateurs redeviennent des `Infix`.
// - Moins unaire : `Prefix(Neg)` + parenthèses synthétiques autour de son opérande.
//   L’opérande absorbe '^' et s’arrête au premier opérateur plus faible,
//   à une ')' ou ',' de sa profondeur, ou en fin de terme.

use std::ops::Range;

use log::{debug, trace};
use num_rational::BigRational;

use super::donnees::{
    constante, est_symbole_valide, Operator, LIAISON_MOINS_UNAIRE, NOMS_CONSTANTES,
    PRECEDENCE_PREFIXE,
};
use super::erreur::InputError;
use super::fonction::{Callable, Fonctions, Function};
use super::format::format_rationnel;
use super::lexer::{lex, nettoyer, Lexeme, Vocabulaire};
use super::nombre::parse_decimal;

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Num(BigRational),
    Sym(char),

    // `poids` = précédence de base, puis pondérée par la profondeur (parseur, phase A)
    Infix { op: Operator, poids: u32 },
    Prefix { fonction: Function, poids: u32 },

    LPar,
    RPar,
    Comma,
}

impl Tok {
    pub fn poids(&self) -> Option<u32> {
        match self {
            Tok::Infix { poids, .. } | Tok::Prefix { poids, .. } => Some(*poids),
            _ => None,
        }
    }
}

/* ------------------------ Découpage en termes ------------------------ */

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Terme(Range<usize>),
    Separateur(usize),
}

/// Coupe aux '+'/'-' binaires hors parenthèses ; le séparateur est son propre segment.
pub fn decouper_termes(lexemes: &[Lexeme]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut p_count: i32 = 0;
    let mut debut = 0;

    for (i, lexeme) in lexemes.iter().enumerate() {
        match lexeme {
            Lexeme::Ouvrante => p_count += 1,
            Lexeme::Fermante => p_count -= 1,
            Lexeme::Operateur {
                op: Operator::Add | Operator::Sub,
                unaire: false,
                ..
            } if p_count == 0 => {
                if debut < i {
                    segments.push(Segment::Terme(debut..i));
                }
                segments.push(Segment::Separateur(i));
                debut = i + 1;
            }
            _ => {}
        }
    }
    if debut < lexemes.len() {
        segments.push(Segment::Terme(debut..lexemes.len()));
    }
    segments
}

/* ------------------------ Tokenizer ------------------------ */

#[derive(Clone, Debug)]
pub struct Tokenizer {
    fonctions: Fonctions,
    symboles: Vec<char>,
    vocabulaire: Vocabulaire,
}

impl Tokenizer {
    pub fn new(fonctions: Fonctions, symboles: &[char]) -> Result<Self, InputError> {
        let symboles = dedoublonner(symboles);
        verifier_symboles(&symboles)?;
        verifier_fonctions(&fonctions, &symboles)?;

        let vocabulaire = Vocabulaire::new(&fonctions, &symboles);
        Ok(Self {
            fonctions,
            symboles,
            vocabulaire,
        })
    }

    pub fn fonctions(&self) -> &Fonctions {
        &self.fonctions
    }

    pub fn symboles(&self) -> &[char] {
        &self.symboles
    }

    /// Remplace le registre de fonctions (validé avant toute modification).
    pub fn set_fonctions(&mut self, fonctions: Fonctions) -> Result<(), InputError> {
        verifier_fonctions(&fonctions, &self.symboles)?;
        self.fonctions = fonctions;
        self.reconstruire();
        Ok(())
    }

    /// Remplace la liste de symboles (validée avant toute modification).
    pub fn set_symboles(&mut self, symboles: &[char]) -> Result<(), InputError> {
        let symboles = dedoublonner(symboles);
        verifier_symboles(&symboles)?;
        verifier_fonctions(&self.fonctions, &symboles)?;
        self.symboles = symboles;
        self.reconstruire();
        Ok(())
    }

    fn reconstruire(&mut self) {
        self.vocabulaire = Vocabulaire::new(&self.fonctions, &self.symboles);
        debug!(
            "vocabulaire reconstruit: {} fonction(s), symboles {:?}",
            self.fonctions.len(),
            self.symboles
        );
    }

    pub fn tokenize(&self, expression: &str) -> Result<Vec<Tok>, InputError> {
        let propre = nettoyer(expression);
        if propre.is_empty() {
            return Err(InputError::Empty);
        }

        let lexemes = lex(&propre, &self.vocabulaire)?;
        let mut jetons = Vec::with_capacity(lexemes.len() + 4);

        for segment in decouper_termes(&lexemes) {
            match segment {
                Segment::Separateur(i) => {
                    if let Lexeme::Operateur { op, .. } = &lexemes[i] {
                        jetons.push(Tok::Infix {
                            op: *op,
                            poids: op.precedence(),
                        });
                    }
                }
                Segment::Terme(r) => self.tokenize_term(&lexemes[r], &mut jetons)?,
            }
        }

        trace!("jetons de {propre:?}: {}", format_tokens(&jetons));
        Ok(jetons)
    }

    fn tokenize_term(&self, lexemes: &[Lexeme], out: &mut Vec<Tok>) -> Result<(), InputError> {
        let mut p_count: i32 = 0;
        // profondeurs (réelles) des moins unaires encore ouverts
        let mut negations: Vec<i32> = Vec::new();

        for lexeme in lexemes {
            match lexeme {
                Lexeme::Fonction(nom) => {
                    let fonction = self
                        .fonctions
                        .get(nom)
                        .ok_or_else(|| InputError::InvalidToken(nom.clone()))?;
                    out.push(Tok::Prefix {
                        fonction,
                        poids: PRECEDENCE_PREFIXE,
                    });
                }
                Lexeme::Operateur { unaire: true, .. } => {
                    out.push(Tok::Prefix {
                        fonction: Function::Operator(Operator::Neg),
                        poids: PRECEDENCE_PREFIXE,
                    });
                    out.push(Tok::LPar);
                    negations.push(p_count);
                }
                Lexeme::Operateur { op, .. } => {
                    if op.precedence() <= LIAISON_MOINS_UNAIRE {
                        fermer_negations(&mut negations, p_count, out);
                    }
                    out.push(Tok::Infix {
                        op: *op,
                        poids: op.precedence(),
                    });
                }
                Lexeme::Nombre(texte) => {
                    let r = parse_decimal(texte)
                        .ok_or_else(|| InputError::InvalidToken(texte.clone()))?;
                    out.push(Tok::Num(r));
                }
                Lexeme::Constante(nom) => {
                    let r = constante(nom).ok_or_else(|| InputError::InvalidToken(nom.clone()))?;
                    out.push(Tok::Num(r));
                }
                Lexeme::Symbole(c) => out.push(Tok::Sym(*c)),
                Lexeme::Ouvrante => {
                    p_count += 1;
                    out.push(Tok::LPar);
                }
                Lexeme::Fermante => {
                    fermer_negations(&mut negations, p_count, out);
                    p_count -= 1;
                    out.push(Tok::RPar);
                }
                Lexeme::Virgule => {
                    fermer_negations(&mut negations, p_count, out);
                    out.push(Tok::Comma);
                }
            }
        }

        // fin de terme : toutes les négations restantes se ferment
        out.extend(negations.drain(..).map(|_| Tok::RPar));
        Ok(())
    }
}

fn fermer_negations(negations: &mut Vec<i32>, p_count: i32, out: &mut Vec<Tok>) {
    while negations.last() == Some(&p_count) {
        negations.pop();
        out.push(Tok::RPar);
    }
}

fn dedoublonner(symboles: &[char]) -> Vec<char> {
    let mut out: Vec<char> = Vec::with_capacity(symboles.len());
    for &c in symboles {
        if !out.contains(&c) {
            out.push(c);
        }
    }
    out
}

/* ------------------------ Validation du registre ------------------------ */

fn verifier_symboles(symboles: &[char]) -> Result<(), InputError> {
    match symboles.iter().find(|c| !est_symbole_valide(**c)) {
        Some(c) => Err(InputError::Symbol(*c)),
        None => Ok(()),
    }
}

/// Noms : lettres ASCII, distincts des constantes et des symboles d’une lettre.
fn verifier_fonctions(fonctions: &Fonctions, symboles: &[char]) -> Result<(), InputError> {
    for nom in fonctions.names() {
        if nom.is_empty() || !nom.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(InputError::FunctionName(nom.to_string()));
        }
        if NOMS_CONSTANTES.contains(&nom) {
            return Err(InputError::NameCollision(nom.to_string()));
        }
        let mut lettres = nom.chars();
        if let (Some(c), None) = (lettres.next(), lettres.next()) {
            if symboles.contains(&c) {
                return Err(InputError::NameCollision(nom.to_string()));
            }
        }
    }
    Ok(())
}

/* ------------------------ Affichage ------------------------ */

/// Format utilitaire (debug/“démarche”) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Tok]) -> String {
    let mut out = Vec::with_capacity(tokens.len());
    for t in tokens {
        let s = match t {
            Tok::Num(r) => format_rationnel(r),
            Tok::Sym(c) => c.to_string(),
            Tok::Infix { op, .. } => op.symbole().to_string(),
            Tok::Prefix {
                fonction: Function::Operator(Operator::Neg),
                ..
            } => "neg".to_string(),
            Tok::Prefix { fonction, .. } => fonction.name().to_string(),
            Tok::LPar => "(".to_string(),
            Tok::RPar => ")".to_string(),
            Tok::Comma => ",".to_string(),
        };
        out.push(s);
    }
    out.join(" ")
}
