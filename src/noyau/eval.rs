//! Noyau — évaluation d’un arbre
//!
//! Trois parcours sur le même arbre :
//! - exact     : rationnels tant que possible, repli flottant par nœud (`Number`) ;
//! - complexe  : `Complex64` bruts, sans passage par les rationnels ;
//! - rapide    : valeurs positionnelles, aucune validation (voir `Ordered`).
//!
//! `evaluate` = exact puis conversion en f64 tout en haut, jamais avant.
//!
//! En bas : `eval_expression`, le pipeline complet utilisé par la démo
//! (valeurs -> jetons -> arbre -> valeur exacte -> lecture décimale).

use std::collections::HashMap;

use log::trace;
use num_complex::Complex64;
use num_traits::ToPrimitive;

use super::arbre::{Bindings, Node, Ordered, ParseTree};
use super::erreur::{Error, EvalError, InputError};
use super::fonction::{Callable, Fonctions};
use super::format::lecture_decimale;
use super::jetons::format_tokens;
use super::nombre::{normaliser, Number};
use super::parseur::Parser;

impl ParseTree {
    /// Valeur flottante ; le calcul interne reste exact autant que possible.
    pub fn evaluate(&self, valeurs: &Bindings) -> Result<f64, Error> {
        Ok(self.evaluate_exact(valeurs)?.to_f64())
    }

    /// Valeur `Number` : `Exact` si tout le calcul a pu rester rationnel.
    ///
    /// Les valeurs flottantes liées sont d’abord converties en fraction
    /// décimale exacte (0.1 => 1/10). Valeur NaN/∞ ou symbole sans valeur :
    /// erreur d’entrée, avant tout calcul.
    pub fn evaluate_exact(&self, valeurs: &Bindings) -> Result<Number, Error> {
        let mut liees: HashMap<char, Number> = HashMap::with_capacity(valeurs.len());
        for (c, v) in valeurs.iter() {
            let exact = v.liee().ok_or(InputError::NonNumericBinding(c))?;
            liees.insert(c, exact);
        }
        if let Some(c) = self.symbols().into_iter().find(|c| !liees.contains_key(c)) {
            return Err(InputError::UnboundSymbol(c).into());
        }

        // présence de chaque symbole vérifiée ci-dessus
        let v = evaluer(self.racine(), &|c| liees[&c].clone())?;
        trace!("{self} = {v}");
        Ok(v)
    }

    /// Évaluation complexe directe (sans coercition rationnelle).
    pub fn evaluate_complex(&self, valeurs: &HashMap<char, Complex64>) -> Result<Complex64, Error> {
        for (c, v) in valeurs {
            if !v.re.is_finite() || !v.im.is_finite() {
                return Err(InputError::NonNumericBinding(*c).into());
            }
        }
        if let Some(c) = self.symbols().into_iter().find(|c| !valeurs.contains_key(c)) {
            return Err(InputError::UnboundSymbol(c).into());
        }

        Ok(evaluer_complexe(self.racine(), valeurs)?)
    }
}

impl Ordered<'_> {
    /// Chemin rapide : `valeurs[i]` est la valeur du i-ème symbole de l’ordre.
    ///
    /// Aucune validation : les valeurs ne sont pas converties en fractions
    /// décimales, un NaN se propage tel quel.
    ///
    /// # Panics
    ///
    /// Si `valeurs` est plus court que l’ordre fixé par `ParseTree::ordered`.
    pub fn evaluate_fast(&self, valeurs: &[f64]) -> Result<f64, EvalError> {
        let positions = &self.positions;
        let v = evaluer(self.arbre.racine(), &|c: char| {
            let i = positions[c as usize].unwrap_or(usize::MAX);
            normaliser(valeurs[i])
        })?;
        Ok(v.to_f64())
    }
}

/* ------------------------ Parcours ------------------------ */

/// Parcours exact : feuilles rationnelles, chaque nœud applique sa fonction.
fn evaluer<F>(noeud: &Node, valeur: &F) -> Result<Number, EvalError>
where
    F: Fn(char) -> Number,
{
    match noeud {
        Node::Rat(r) => Ok(Number::Exact(r.clone())),
        Node::Var(c) => Ok(valeur(*c)),
        Node::Op { fonction, enfants } => {
            let args = enfants
                .iter()
                .map(|e| evaluer(e, valeur))
                .collect::<Result<Vec<_>, _>>()?;
            fonction.apply(&args)
        }
    }
}

fn evaluer_complexe(
    noeud: &Node,
    valeurs: &HashMap<char, Complex64>,
) -> Result<Complex64, EvalError> {
    match noeud {
        Node::Rat(r) => Ok(Complex64::new(r.to_f64().unwrap_or(f64::NAN), 0.0)),
        // présence vérifiée par l’appelant
        Node::Var(c) => Ok(valeurs.get(c).copied().unwrap_or(Complex64::new(f64::NAN, 0.0))),
        Node::Op { fonction, enfants } => {
            let args = enfants
                .iter()
                .map(|e| evaluer_complexe(e, valeurs))
                .collect::<Result<Vec<_>, _>>()?;
            fonction.apply_complex(&args)
        }
    }
}

/* ------------------------ Pipeline (démo) ------------------------ */

#[derive(Default, Clone, Debug)]
pub struct DemarcheNoyau {
    pub jetons: String,
    pub arbre: String,
    pub symboles: String,
    pub note: String,
}

#[derive(Clone, Debug)]
pub struct Resultat {
    pub reel: f64,
    pub exact: Number,
    /// Lecture décimale tronquée : None si le résultat n’est pas exact.
    pub lecture: Option<String>,
    pub demarche: DemarcheNoyau,
}

/// Évalue une saisie complète :
/// - `entree`   : expression, ou équation "g = d" (évaluée comme g - d)
/// - `symboles` : symboles autorisés
/// - `valeurs`  : "x=2, y=1/3" (chaque valeur est une expression sans symbole)
/// - `digits`   : précision de la lecture décimale
pub fn eval_expression(
    entree: &str,
    symboles: &[char],
    valeurs: &str,
    digits: usize,
) -> Result<Resultat, Error> {
    let parser = Parser::new(Fonctions::standard(), symboles)?;
    let liees = lire_valeurs(valeurs)?;

    // 1) Jetons (chaque côté d’une équation)
    let jetons = entree
        .split('=')
        .map(|cote| parser.tokenize(cote).map(|t| format_tokens(&t)))
        .collect::<Result<Vec<_>, _>>()?
        .join("  =  ");

    // 2) Arbre
    let arbre = if entree.contains('=') {
        parser.parse_equation(entree)?
    } else {
        parser.parse(entree)?
    };

    // 3) Valeur exacte, puis lectures
    let exact = arbre.evaluate_exact(&liees)?;
    let lecture = exact.exact().map(|r| lecture_decimale(r, digits));

    let demarche = DemarcheNoyau {
        jetons,
        arbre: arbre.to_string(),
        symboles: arbre
            .symbols()
            .iter()
            .map(char::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        note: "Pipeline: normalisation → termes → jetons → poids → arbre → évaluation exacte → lecture.".into(),
    };

    Ok(Resultat {
        reel: exact.to_f64(),
        exact,
        lecture,
        demarche,
    })
}

/// "x=2, y=max(1,3)" -> valeurs exactes. Les virgules entre parenthèses
/// appartiennent aux valeurs.
pub fn lire_valeurs(texte: &str) -> Result<Bindings, Error> {
    let constantes = Parser::new(Fonctions::standard(), &[])?;
    let mut out = Bindings::new();

    for item in decouper_hors_parentheses(texte, ',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let (nom, expr) = item
            .split_once('=')
            .ok_or_else(|| InputError::InvalidToken(item.to_string()))?;

        let nom = nom.trim();
        let mut lettres = nom.chars();
        let c = match (lettres.next(), lettres.next()) {
            (Some(c), None) => c,
            _ => return Err(InputError::InvalidToken(nom.to_string()).into()),
        };

        let v = constantes.parse(expr)?.evaluate_exact(&Bindings::new())?;
        out.set(c, v);
    }
    Ok(out)
}

fn decouper_hors_parentheses(texte: &str, sep: char) -> Vec<&str> {
    let mut morceaux = Vec::new();
    let mut p_count: i32 = 0;
    let mut debut = 0;

    for (i, c) in texte.char_indices() {
        match c {
            '(' => p_count += 1,
            ')' => p_count -= 1,
            _ if c == sep && p_count == 0 => {
                morceaux.push(&texte[debut..i]);
                debut = i + c.len_utf8();
            }
            _ => {}
        }
    }
    morceaux.push(&texte[debut..]);
    morceaux
}
