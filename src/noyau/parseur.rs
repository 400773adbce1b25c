// src/noyau/parseur.rs
//
// Jetons -> arbre, sans pile d’opérateurs ni nœud de parenthèse.
//
// Phase A (pondération) : chaque Infix/Prefix reçoit `profondeur × POIDS_PARENTHESE`
// en plus de sa précédence ; les parenthèses ne servent plus qu’à ça.
// Phase B (construction) : récursion sur des intervalles d’un seul tampon.
// Dans un intervalle, l’opérateur de poids minimal devient la racine :
// - égalité, associatif à gauche : le plus à droite (10-3-2 = (10-3)-2) ;
// - égalité, associatif à droite (^, préfixes) : le plus à gauche (2^3^2 = 2^(3^2)).

use std::ops::Range;

use log::{debug, trace};

use super::arbre::{Node, ParseTree};
use super::donnees::{Associativite, Operator, POIDS_PARENTHESE};
use super::erreur::InputError;
use super::fonction::{Callable, Fonctions, Function};
use super::jetons::{format_tokens, Tok, Tokenizer};

#[derive(Clone, Debug)]
pub struct Parser {
    tokenizer: Tokenizer,
}

impl Parser {
    /// Registre validé ici : voir `InputError::{FunctionName, Symbol, NameCollision}`.
    pub fn new(fonctions: Fonctions, symboles: &[char]) -> Result<Self, InputError> {
        let tokenizer = Tokenizer::new(fonctions, symboles)?;
        debug!(
            "parseur: {} fonction(s), symboles {:?}",
            tokenizer.fonctions().len(),
            tokenizer.symboles()
        );
        Ok(Self { tokenizer })
    }

    /* ------------------------ Registre ------------------------ */

    /// Ajoute (ou remplace, à nom égal) des fonctions.
    pub fn define_functions(&mut self, fonctions: Fonctions) -> Result<(), InputError> {
        let mut toutes = self.tokenizer.fonctions().clone();
        toutes.extend(fonctions);
        self.tokenizer.set_fonctions(toutes)
    }

    /// Remplace tout le registre de fonctions.
    pub fn redefine_functions(&mut self, fonctions: Fonctions) -> Result<(), InputError> {
        self.tokenizer.set_fonctions(fonctions)
    }

    pub fn define_symbols(&mut self, symboles: &[char]) -> Result<(), InputError> {
        let mut tous = self.tokenizer.symboles().to_vec();
        tous.extend_from_slice(symboles);
        self.tokenizer.set_symboles(&tous)
    }

    pub fn redefine_symbols(&mut self, symboles: &[char]) -> Result<(), InputError> {
        self.tokenizer.set_symboles(symboles)
    }

    pub fn functions(&self) -> &Fonctions {
        self.tokenizer.fonctions()
    }

    pub fn symbols(&self) -> &[char] {
        self.tokenizer.symboles()
    }

    /* ------------------------ Analyse ------------------------ */

    pub fn tokenize(&self, expression: &str) -> Result<Vec<Tok>, InputError> {
        self.tokenizer.tokenize(expression)
    }

    pub fn parse(&self, expression: &str) -> Result<ParseTree, InputError> {
        debug!("analyse de {expression:?}");

        let mut jetons = self.tokenizer.tokenize(expression)?;
        ponderer(&mut jetons)?;
        trace!("poids: {}", format_poids(&jetons));

        let racine = construire(&jetons, 0..jetons.len())?;
        let arbre = ParseTree::new(racine);
        debug!("arbre: {arbre}");
        Ok(arbre)
    }

    /// "g = d" -> arbre de g - d (un seul '=').
    pub fn parse_equation(&self, texte: &str) -> Result<ParseTree, InputError> {
        let (gauche, droite) = texte.split_once('=').ok_or(InputError::Equation)?;
        if droite.contains('=') {
            return Err(InputError::Equation);
        }

        let g = self.parse(gauche)?;
        let d = self.parse(droite)?;
        Ok(ParseTree::new(Node::Op {
            fonction: Function::Operator(Operator::Sub),
            enfants: vec![g.racine().clone(), d.racine().clone()],
        }))
    }
}

/* ------------------------ Phase A ------------------------ */

fn ponderer(jetons: &mut [Tok]) -> Result<(), InputError> {
    let mut p_count: u32 = 0;
    for t in jetons.iter_mut() {
        match t {
            Tok::LPar => p_count += 1,
            Tok::RPar => {
                p_count = p_count
                    .checked_sub(1)
                    .ok_or(InputError::UnmatchedParenthesis)?;
            }
            Tok::Infix { poids, .. } | Tok::Prefix { poids, .. } => {
                *poids += p_count * POIDS_PARENTHESE;
            }
            _ => {}
        }
    }
    if p_count != 0 {
        return Err(InputError::UnmatchedParenthesis);
    }
    Ok(())
}

fn format_poids(jetons: &[Tok]) -> String {
    jetons
        .iter()
        .filter_map(|t| t.poids().map(|w| format!("{}:{w}", format_tokens(std::slice::from_ref(t)))))
        .collect::<Vec<_>>()
        .join(" ")
}

/* ------------------------ Phase B ------------------------ */

fn associativite(t: &Tok) -> Associativite {
    match t {
        Tok::Infix { op, .. } => op.associativite(),
        _ => Associativite::Droite,
    }
}

fn construire(jetons: &[Tok], r: Range<usize>) -> Result<Node, InputError> {
    let mut choix: Option<(usize, u32)> = None;
    for i in r.clone() {
        let Some(w) = jetons[i].poids() else {
            continue;
        };
        let prendre = match choix {
            None => true,
            Some((_, meilleur)) => {
                w < meilleur || (w == meilleur && associativite(&jetons[i]) == Associativite::Gauche)
            }
        };
        if prendre {
            choix = Some((i, w));
        }
    }

    let Some((k, _)) = choix else {
        return feuille(jetons, r);
    };
    match &jetons[k] {
        Tok::Infix { op, .. } => {
            let gauche = construire(jetons, r.start..k)?;
            let droite = construire(jetons, k + 1..r.end)?;
            Ok(Node::Op {
                fonction: Function::Operator(*op),
                enfants: vec![gauche, droite],
            })
        }
        Tok::Prefix { fonction, .. } => appel(jetons, r, k, fonction),
        _ => feuille(jetons, r),
    }
}

/// Intervalle sans opérateur : exactement un nombre ou un symbole (parenthèses ignorées).
fn feuille(jetons: &[Tok], r: Range<usize>) -> Result<Node, InputError> {
    let mut valeurs = jetons[r]
        .iter()
        .filter(|t| !matches!(t, Tok::LPar | Tok::RPar));

    let premier = valeurs.next().ok_or(InputError::MissingOperand)?;
    if let Some(t) = valeurs.next() {
        return Err(inattendu(t));
    }
    match premier {
        Tok::Num(n) => Ok(Node::Rat(n.clone())),
        Tok::Sym(c) => Ok(Node::Var(*c)),
        autre => Err(inattendu(autre)),
    }
}

/// Préfixe en `k` : "(" obligatoire, arguments séparés par les virgules de profondeur 1.
fn appel(
    jetons: &[Tok],
    r: Range<usize>,
    k: usize,
    fonction: &Function,
) -> Result<Node, InputError> {
    if k + 1 >= r.end || jetons[k + 1] != Tok::LPar {
        return Err(InputError::MissingCall(fonction.name().to_string()));
    }

    let mut p_count: u32 = 0;
    let mut debut = k + 2;
    let mut args: Vec<Range<usize>> = Vec::new();
    let mut fermeture = None;

    for i in k + 1..r.end {
        match &jetons[i] {
            Tok::LPar => p_count += 1,
            Tok::RPar => {
                p_count -= 1;
                if p_count == 0 {
                    args.push(debut..i);
                    fermeture = Some(i);
                    break;
                }
            }
            Tok::Comma if p_count == 1 => {
                args.push(debut..i);
                debut = i + 1;
            }
            _ => {}
        }
    }
    let fin = fermeture.ok_or(InputError::UnmatchedParenthesis)?;

    // "f()" : aucun argument (et non un argument vide)
    if fin == k + 2 {
        args.clear();
    }

    // hors de l’appel : seulement des parenthèses englobantes
    if let Some(t) = jetons[r.start..k]
        .iter()
        .chain(&jetons[fin + 1..r.end])
        .find(|t| !matches!(t, Tok::LPar | Tok::RPar))
    {
        return Err(inattendu(t));
    }

    let arite = fonction.arity();
    if !arite.accepte(args.len()) {
        return Err(InputError::Arity {
            name: fonction.name().to_string(),
            expected: arite.to_string(),
            got: args.len(),
        });
    }

    let enfants = args
        .into_iter()
        .map(|a| construire(jetons, a))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Node::Op {
        fonction: fonction.clone(),
        enfants,
    })
}

fn inattendu(t: &Tok) -> InputError {
    InputError::UnexpectedToken(format_tokens(std::slice::from_ref(t)))
}
