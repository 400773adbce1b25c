//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée
//! - budget temps global
//! - expressions bien formées : le parse doit réussir, seules les erreurs
//!   d’évaluation (division par zéro, domaine) sont acceptées
//! - bruit : jamais de panique, quelle que soit l’entrée

use std::time::{Duration, Instant};

use super::arbre::Bindings;
use super::erreur::Error;
use super::fonction::Fonctions;
use super::parseur::Parser;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Helpers fuzz ------------------------ */

fn parser() -> Parser {
    Parser::new(Fonctions::standard(), &['x', 'y']).unwrap_or_else(|e| panic!("registre: {e}"))
}

fn valeurs(rng: &mut Rng) -> Bindings {
    let vx = rng.pick(17) as f64 / 4.0 - 2.0;
    let vy = rng.pick(9) as i32 - 4;
    Bindings::new().with('x', vx).with('y', vy)
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

fn gen_atom(rng: &mut Rng) -> String {
    match rng.pick(7) {
        0 | 1 => format!("{}", rng.pick(10)),
        2 => format!("{}.{}", rng.pick(10), rng.pick(100)),
        3 => "x".to_string(),
        4 => "y".to_string(),
        5 => "pi".to_string(),
        _ => "e".to_string(),
    }
}

fn gen_exposant(rng: &mut Rng) -> String {
    match rng.pick(9) {
        0 => "0".to_string(),
        1 => "1".to_string(),
        2 => "2".to_string(),
        3 => "3".to_string(),
        4 => "-1".to_string(),
        5 => "(1/2)".to_string(),
        // au-delà des anciennes bornes de la puissance exacte
        6 => "4097".to_string(),
        7 => "(-9223372036854775808)".to_string(),
        _ => "(10^30)".to_string(),
    }
}

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return gen_atom(rng);
    }
    let sous = |rng: &mut Rng| gen_expr(rng, depth - 1);

    match rng.pick(11) {
        0 => gen_atom(rng),
        1 => format!("({}+{})", sous(rng), sous(rng)),
        2 => format!("({}-{})", sous(rng), sous(rng)),
        3 => format!("({}*{})", sous(rng), sous(rng)),
        4 => format!("({}/{})", sous(rng), sous(rng)),
        5 => format!("({}%{})", sous(rng), sous(rng)),
        6 => format!("({})^{}", sous(rng), gen_exposant(rng)),
        7 => {
            if rng.coin() {
                format!("-{}", gen_atom(rng))
            } else {
                format!("(-{})", sous(rng))
            }
        }
        8 => {
            let f = ["sin", "cos", "sqrt", "abs", "floor", "ln"][rng.pick(6) as usize];
            format!("{f}({})", sous(rng))
        }
        9 => format!("max({},{},{})", sous(rng), sous(rng), sous(rng)),
        // multiplication implicite
        _ => format!("{}({})", gen_atom(rng), sous(rng)),
    }
}

/// Bruit : caractères du vocabulaire + quelques intrus.
fn gen_bruit(rng: &mut Rng) -> String {
    const ALPHABET: &[char] = &[
        '0', '1', '2', '9', '.', 'x', 'y', '+', '-', '*', '/', '^', '%', '(', ')', ',', ' ', 's',
        'i', 'n', 'p', 'e', 'q', '#',
    ];
    let n = 1 + rng.pick(14) as usize;
    (0..n)
        .map(|_| ALPHABET[rng.pick(ALPHABET.len() as u32) as usize])
        .collect()
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = (0..n).map(|_| terme.to_string()).collect();
    while items.len() > 1 {
        let mut next = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if i + 1 < items.len() {
                next.push(format!("({}+{})", items[i], items[i + 1]));
                i += 2;
            } else {
                next.push(items[i].clone());
                i += 1;
            }
        }
        items = next;
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_determinisme_et_erreurs_attendues() {
    let t0 = Instant::now();
    let max = Duration::from_millis(3000);

    let p = parser();
    let mut rng = Rng::new(0xC0FFEE_u64);

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for _ in 0..150 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 4);
        let b = valeurs(&mut rng);

        let t = p
            .parse(&expr)
            .unwrap_or_else(|e| panic!("parse non attendu: expr={expr:?} err={e}"));
        // même texte => même arbre
        assert_eq!(t, p.parse(&expr).unwrap(), "expr={expr:?}");

        let v = t.evaluate_exact(&b);
        assert_eq!(v, t.evaluate_exact(&b), "expr={expr:?}");

        match v {
            Ok(_) => seen_ok += 1,
            Err(Error::Evaluation(_)) => seen_err += 1,
            Err(e) => panic!("erreur non attendue: expr={expr:?} err={e}"),
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(seen_ok > 10, "trop peu de succès: {seen_ok}");
    assert!(seen_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_affichage_relisible() {
    let t0 = Instant::now();
    let max = Duration::from_millis(3000);

    let p = parser();
    let mut rng = Rng::new(0xBADC0DE_u64);

    for _ in 0..100 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 3);
        let b = valeurs(&mut rng);
        let t = p.parse(&expr).unwrap();

        // l’affichage se relit en un arbre de même valeur
        let texte = t.to_string();
        let relu = p
            .parse(&texte)
            .unwrap_or_else(|e| panic!("relecture: expr={expr:?} affiché={texte:?} err={e}"));
        assert_eq!(
            relu.evaluate_exact(&b),
            t.evaluate_exact(&b),
            "expr={expr:?} affiché={texte:?}"
        );
    }
}

#[test]
fn fuzz_safe_bruit_sans_panique() {
    let t0 = Instant::now();
    let max = Duration::from_millis(3000);

    let p = parser();
    let mut rng = Rng::new(0x5EED_u64);
    let b = Bindings::new().with('x', 2).with('y', -1);

    let mut seen_ok = 0usize;
    for _ in 0..400 {
        budget(t0, max);

        let bruit = gen_bruit(&mut rng);
        if let Ok(t) = p.parse(&bruit) {
            seen_ok += 1;
            // le résultat importe peu : il ne doit jamais paniquer
            let _ = t.evaluate(&b);
        }
    }
    assert!(seen_ok > 0, "aucun bruit n’a produit d’arbre");
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_millis(3000);

    let expr = somme_balancee("1/2", 800);
    let t = parser().parse(&expr).unwrap_or_else(|e| panic!("err: {e}"));
    budget(t0, max);

    // 800*(1/2) = 400
    let v = t.evaluate_exact(&Bindings::new()).unwrap();
    assert_eq!(v.to_string(), "400");
}
