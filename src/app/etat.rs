//! src/app/etat.rs
//!
//! État UI (sans vue, sans noyau).
//!
//! Contient l’expression, les valeurs liées, les symboles autorisés, les résultats
//! et la démarche. Aucune évaluation ici.

/// Précision de la lecture décimale par défaut.
const DIGITS_DEFAUT: usize = 20;

/// Garde-fou : précision bornée.
const DIGITS_MAX: usize = 200;

/// Symboles autorisés au démarrage.
const SYMBOLES_DEFAUT: &str = "x y";

#[derive(Clone, Default, Debug)]
pub struct Demarche {
    pub jetons: String,
    pub arbre: String,
    pub symboles: String,
    pub note: String,
}

#[derive(Clone, Debug)]
pub struct AppAnalyseur {
    // --- entrées utilisateur ---
    pub entree: String,
    /// "x=2, y=1/3"
    pub valeurs: String,
    /// Symboles autorisés, séparés ou non par des espaces : "x y"
    pub symboles: String,

    // --- sorties ---
    pub reel: String,
    pub exact: String,
    pub lecture: String,
    pub erreur: String,
    pub lecture_dispo: bool,

    pub demarche: Demarche,

    pub digits: usize,

    /// vue.rs redonne le focus à l’entrée après un clic.
    pub focus_entree: bool,
}

impl Default for AppAnalyseur {
    fn default() -> Self {
        Self {
            entree: String::new(),
            valeurs: String::new(),
            symboles: SYMBOLES_DEFAUT.to_string(),
            reel: String::new(),
            exact: String::new(),
            lecture: String::new(),
            erreur: String::new(),
            lecture_dispo: false,
            demarche: Demarche::default(),
            digits: DIGITS_DEFAUT,
            focus_entree: true,
        }
    }
}

impl AppAnalyseur {
    /* ------------------------ Actions “boutons” ------------------------ */

    /// AC : remise à zéro totale (entrées + résultats + réglages par défaut).
    pub fn reset_total(&mut self) {
        self.entree.clear();
        self.valeurs.clear();
        self.symboles = SYMBOLES_DEFAUT.to_string();
        self.clear_resultats();
        self.digits = DIGITS_DEFAUT;
        self.focus_entree = true;
    }

    /// C : effacer seulement l’expression.
    pub fn clear_entree(&mut self) {
        self.entree.clear();
        self.focus_entree = true;
    }

    /// CLR : effacer résultats + erreur + démarche.
    pub fn clear_resultats(&mut self) {
        self.reel.clear();
        self.exact.clear();
        self.lecture.clear();
        self.erreur.clear();
        self.lecture_dispo = false;
        self.demarche = Demarche::default();
        self.focus_entree = true;
    }

    /// On conserve le dernier résultat affiché ; lecture et démarche tombent.
    pub fn set_erreur(&mut self, msg: impl Into<String>) {
        self.erreur = msg.into();
        self.lecture.clear();
        self.lecture_dispo = false;
        self.demarche = Demarche::default();
        self.focus_entree = true;
    }

    pub fn set_resultats(
        &mut self,
        reel: f64,
        exact: impl Into<String>,
        lecture: Option<String>,
        demarche: Demarche,
    ) {
        self.erreur.clear();
        self.reel = reel.to_string();
        self.exact = exact.into();
        self.demarche = demarche;

        match lecture {
            Some(v) => {
                self.lecture_dispo = true;
                self.lecture = v;
            }
            None => {
                self.lecture_dispo = false;
                self.lecture.clear();
            }
        }
        self.focus_entree = true;
    }

    pub fn set_digits(&mut self, digits: usize) {
        self.digits = digits.min(DIGITS_MAX);
        self.focus_entree = true;
    }

    /// "x y" / "xy" / "x, y" -> ['x', 'y']
    pub fn symboles_autorises(&self) -> Vec<char> {
        self.symboles
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .collect()
    }
}
