//! User-facing text in the supported languages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    Catalan,
    Spanish,
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Catalan => "ca",
            Language::Spanish => "es",
            Language::English => "en",
        }
    }

    /// Name of the language in that language, used in tutor instructions.
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::Catalan => "català",
            Language::Spanish => "español",
            Language::English => "English",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.native_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLanguage(pub String);

impl fmt::Display for UnknownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown language '{}' (expected ca, es or en)", self.0)
    }
}

impl std::error::Error for UnknownLanguage {}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ca" | "cat" | "catalan" | "català" => Ok(Language::Catalan),
            "es" | "spa" | "spanish" | "español" | "castellano" => Ok(Language::Spanish),
            "en" | "eng" | "english" => Ok(Language::English),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

/// Notices the controller raises; rendered per language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    NewDataGenerated,
    DataRestored,
    NoRecentData,
    AllCorrect,
    MarksIncomplete,
    ExerciseSaved,
    CredentialSaved,
    CredentialInvalid,
    CredentialCleared,
    CredentialMissing,
    LanguageChanged,
    TutorOnline,
}

pub fn message(notice: Notice, language: Language) -> &'static str {
    use Language::*;
    use Notice::*;

    match (notice, language) {
        (NewDataGenerated, Catalan) => "Noves dades generades",
        (NewDataGenerated, Spanish) => "Nuevos datos generados",
        (NewDataGenerated, English) => "New data generated",

        (DataRestored, Catalan) => "Dades recuperades de la sessió",
        (DataRestored, Spanish) => "Datos recuperados de la sesión",
        (DataRestored, English) => "Data restored from the session",

        (NoRecentData, Catalan) => "No hi ha dades recents guardades",
        (NoRecentData, Spanish) => "No hay datos recientes guardados",
        (NoRecentData, English) => "No recent saved data",

        (AllCorrect, Catalan) => "Excel·lent! Tots els intervals són correctes",
        (AllCorrect, Spanish) => "¡Excelente! Todos los intervalos son correctos",
        (AllCorrect, English) => "Excellent! Every interval is correct",

        (MarksIncomplete, Catalan) => "Encara hi ha marques de classe pendents o incorrectes",
        (MarksIncomplete, Spanish) => "Aún hay marcas de clase pendientes o incorrectas",
        (MarksIncomplete, English) => "Some class marks are still missing or wrong",

        (ExerciseSaved, Catalan) => "Resultats guardats",
        (ExerciseSaved, Spanish) => "Resultados guardados",
        (ExerciseSaved, English) => "Results saved",

        (CredentialSaved, Catalan) => "Connexió establerta",
        (CredentialSaved, Spanish) => "Conexión establecida",
        (CredentialSaved, English) => "Connection established",

        (CredentialInvalid, Catalan) => "Clau invàlida",
        (CredentialInvalid, Spanish) => "Clave inválida",
        (CredentialInvalid, English) => "Invalid key",

        (CredentialCleared, Catalan) => "Clau eliminada",
        (CredentialCleared, Spanish) => "Clave eliminada",
        (CredentialCleared, English) => "Key removed",

        (CredentialMissing, Catalan) => "ERROR: Clau de l'API no configurada",
        (CredentialMissing, Spanish) => "ERROR: Clave de la API no configurada",
        (CredentialMissing, English) => "ERROR: API key not configured",

        (LanguageChanged, Catalan) => "Idioma canviat",
        (LanguageChanged, Spanish) => "Idioma cambiado",
        (LanguageChanged, English) => "Language changed",

        (TutorOnline, Catalan) => "Connexió xifrada amb l'Oracle... [ONLINE]",
        (TutorOnline, Spanish) => "Conexión cifrada con el Oráculo... [ONLINE]",
        (TutorOnline, English) => "Encrypted link to the Oracle... [ONLINE]",
    }
}

/// Advisory shown when the last interval stops short of the data maximum.
pub fn coverage_warning(language: Language, last_upper: f64, max: f64) -> String {
    match language {
        Language::Catalan => format!(
            "Atenció: l'últim interval acaba a {} però el màxim de les dades és {}",
            last_upper, max
        ),
        Language::Spanish => format!(
            "Atención: el último intervalo acaba en {} pero el máximo de los datos es {}",
            last_upper, max
        ),
        Language::English => format!(
            "Warning: the last interval ends at {} but the data maximum is {}",
            last_upper, max
        ),
    }
}

/// Labels for the state view.
#[derive(Debug, Clone, Copy)]
pub struct Labels {
    pub data: &'static str,
    pub start: &'static str,
    pub amplitude: &'static str,
    pub interval: &'static str,
    pub mark: &'static str,
    pub continue_ready: &'static str,
    pub continue_locked: &'static str,
    pub next_exercise: &'static str,
    pub processing: &'static str,
}

pub fn labels(language: Language) -> Labels {
    match language {
        Language::Catalan => Labels {
            data: "Dades",
            start: "Inici",
            amplitude: "Amplitud",
            interval: "Interval",
            mark: "Marca",
            continue_ready: "Continuar: disponible",
            continue_locked: "Continuar: bloquejat",
            next_exercise: "Següent exercici",
            processing: "● ● ● Processant...",
        },
        Language::Spanish => Labels {
            data: "Datos",
            start: "Inicio",
            amplitude: "Amplitud",
            interval: "Intervalo",
            mark: "Marca",
            continue_ready: "Continuar: disponible",
            continue_locked: "Continuar: bloqueado",
            next_exercise: "Siguiente ejercicio",
            processing: "● ● ● Procesando...",
        },
        Language::English => Labels {
            data: "Data",
            start: "Start",
            amplitude: "Amplitude",
            interval: "Interval",
            mark: "Mark",
            continue_ready: "Continue: available",
            continue_locked: "Continue: locked",
            next_exercise: "Next exercise",
            processing: "● ● ● Processing...",
        },
    }
}
