//! Anatomical markings anchored on reference body images.
//!
//! Coordinates are percentages of the rendered image bounds, so a marking
//! placed on a small thumbnail lands on the same spot of the full-size image.

use serde::{Deserialize, Serialize};

use crate::reference::Referencia;
use crate::validation::{required, ValidationError};

/// Kinds of findings offered by the marking form.
pub const TIPOS_MARCACAO: [&str; 6] = [
    "lesão",
    "cicatriz",
    "tatuagem",
    "fratura",
    "marca de mordida",
    "outro",
];

/// Point on an image, as percentages in `[0, 100]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(from = "RawCoordenadas")]
pub struct Coordenadas {
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct RawCoordenadas {
    x: f64,
    y: f64,
}

impl From<RawCoordenadas> for Coordenadas {
    fn from(raw: RawCoordenadas) -> Self {
        Self::new(raw.x, raw.y)
    }
}

fn clamp_percent(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

fn percent_of(offset: f64, size: f64) -> f64 {
    if size > 0.0 {
        ((offset / size) * 10_000.0).round() / 100.0
    } else {
        0.0
    }
}

impl Coordenadas {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_percent(x),
            y: clamp_percent(y),
        }
    }

    /// Convert a click offset inside a rendered image to percentages.
    pub fn from_click(offset_x: f64, offset_y: f64, width: f64, height: f64) -> Self {
        Self::new(percent_of(offset_x, width), percent_of(offset_y, height))
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Inline style placing an overlay dot at this point
    pub fn css_position(&self) -> String {
        format!("left:{}%;top:{}%;", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CategoriaImagem {
    #[default]
    CorpoInteiro,
    Cranio,
    Mao,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Vista {
    #[default]
    Anterior,
    Posterior,
    Lateral,
}

/// Sex for whole-body images, laterality for the others
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Lado {
    Masculino,
    Feminino,
    Direito,
    Esquerdo,
}

impl CategoriaImagem {
    pub const ALL: [CategoriaImagem; 3] = [Self::CorpoInteiro, Self::Cranio, Self::Mao];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CorpoInteiro => "corpo_inteiro",
            Self::Cranio => "cranio",
            Self::Mao => "mao",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::CorpoInteiro => "Corpo inteiro",
            Self::Cranio => "Crânio",
            Self::Mao => "Mão",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }

    pub fn vistas(&self) -> &'static [Vista] {
        match self {
            Self::CorpoInteiro => &[Vista::Anterior, Vista::Posterior],
            Self::Cranio => &[Vista::Anterior, Vista::Lateral],
            Self::Mao => &[Vista::Anterior, Vista::Posterior],
        }
    }

    pub fn lados(&self) -> &'static [Lado] {
        match self {
            Self::CorpoInteiro => &[Lado::Masculino, Lado::Feminino],
            Self::Cranio | Self::Mao => &[Lado::Direito, Lado::Esquerdo],
        }
    }

    /// Region catalog as `(codigo, nome)` pairs
    pub fn regioes(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::CorpoInteiro => &[
                ("CAB", "Cabeça"),
                ("PES", "Pescoço"),
                ("TOR", "Tórax"),
                ("ABD", "Abdome"),
                ("MSD", "Membro superior direito"),
                ("MSE", "Membro superior esquerdo"),
                ("MID", "Membro inferior direito"),
                ("MIE", "Membro inferior esquerdo"),
            ],
            Self::Cranio => &[
                ("FRO", "Frontal"),
                ("PAR", "Parietal"),
                ("TEM", "Temporal"),
                ("OCC", "Occipital"),
                ("ZIG", "Zigomático"),
                ("MAX", "Maxila"),
                ("MAN", "Mandíbula"),
            ],
            Self::Mao => &[
                ("CAR", "Carpo"),
                ("MET", "Metacarpo"),
                ("POL", "Polegar"),
                ("IND", "Indicador"),
                ("MED", "Médio"),
                ("ANE", "Anelar"),
                ("MIN", "Mínimo"),
            ],
        }
    }
}

impl Vista {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anterior => "anterior",
            Self::Posterior => "posterior",
            Self::Lateral => "lateral",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Anterior => "Anterior",
            Self::Posterior => "Posterior",
            Self::Lateral => "Lateral",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [Self::Anterior, Self::Posterior, Self::Lateral]
            .into_iter()
            .find(|v| v.as_str() == s)
    }
}

impl Lado {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Masculino => "masculino",
            Self::Feminino => "feminino",
            Self::Direito => "direito",
            Self::Esquerdo => "esquerdo",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Masculino => "Masculino",
            Self::Feminino => "Feminino",
            Self::Direito => "Direito",
            Self::Esquerdo => "Esquerdo",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [Self::Masculino, Self::Feminino, Self::Direito, Self::Esquerdo]
            .into_iter()
            .find(|l| l.as_str() == s)
    }
}

/// Which reference image a marking is placed on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ImagemConfig {
    pub categoria: CategoriaImagem,
    pub vista: Vista,
    pub lado: Lado,
}

impl Default for ImagemConfig {
    fn default() -> Self {
        Self::for_categoria(CategoriaImagem::default())
    }
}

impl ImagemConfig {
    /// First valid view and side for a category
    pub fn for_categoria(categoria: CategoriaImagem) -> Self {
        Self {
            categoria,
            vista: categoria.vistas()[0],
            lado: categoria.lados()[0],
        }
    }

    /// Keep the selection consistent after one field changed
    pub fn normalized(self) -> Self {
        let vista = if self.categoria.vistas().contains(&self.vista) {
            self.vista
        } else {
            self.categoria.vistas()[0]
        };
        let lado = if self.categoria.lados().contains(&self.lado) {
            self.lado
        } else {
            self.categoria.lados()[0]
        };
        Self {
            categoria: self.categoria,
            vista,
            lado,
        }
    }

    pub fn image_path(&self) -> String {
        format!(
            "/assets/anatomia/{}_{}_{}.svg",
            self.categoria.as_str(),
            self.vista.as_str(),
            self.lado.as_str()
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Regiao {
    pub codigo: String,
    pub nome: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tamanho {
    Pequeno,
    #[default]
    Medio,
    Grande,
}

impl Tamanho {
    pub const ALL: [Tamanho; 3] = [Self::Pequeno, Self::Medio, Self::Grande];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pequeno => "pequeno",
            Self::Medio => "medio",
            Self::Grande => "grande",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pequeno => "Pequeno",
            Self::Medio => "Médio",
            Self::Grande => "Grande",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Overlay dot diameter in pixels
    pub fn dot_px(&self) -> u32 {
        match self {
            Self::Pequeno => 8,
            Self::Medio => 12,
            Self::Grande => 18,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarcacaoAnatomica {
    #[serde(rename = "_id")]
    pub id: String,
    pub vitima: Referencia,
    pub tipo: String,
    pub regiao: Regiao,
    #[serde(default)]
    pub descricao: String,
    #[serde(default = "default_cor")]
    pub cor: String,
    #[serde(default)]
    pub tamanho: Tamanho,
    pub coordenadas: Coordenadas,
    #[serde(flatten)]
    pub imagem: ImagemConfig,
}

fn default_cor() -> String {
    "#e53935".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NovaMarcacao {
    pub vitima: String,
    pub tipo: String,
    pub regiao: Regiao,
    pub descricao: String,
    pub cor: String,
    pub tamanho: Tamanho,
    pub coordenadas: Coordenadas,
    #[serde(flatten)]
    pub imagem: ImagemConfig,
}

impl NovaMarcacao {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required("vitima", &self.vitima)?;
        required("tipo", &self.tipo)?;
        required("regiao", &self.regiao.codigo)?;
        if !self
            .imagem
            .categoria
            .regioes()
            .iter()
            .any(|(codigo, _)| *codigo == self.regiao.codigo)
        {
            return Err(ValidationError::Invalid {
                field: "regiao",
                reason: format!("{} não pertence a {}", self.regiao.codigo, self.imagem.categoria.label()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_is_scale_independent() {
        let small = Coordenadas::from_click(50.0, 25.0, 200.0, 100.0);
        let large = Coordenadas::from_click(400.0, 200.0, 1600.0, 800.0);
        assert_eq!(small, large);
        assert_eq!(small.x(), 25.0);
        assert_eq!(small.y(), 25.0);
    }

    #[test]
    fn test_coordinates_always_within_bounds() {
        let cases = [
            (-10.0, 5.0, 100.0, 100.0),
            (150.0, 300.0, 100.0, 200.0),
            (10.0, 10.0, 0.0, -5.0),
            (f64::NAN, 1.0, 10.0, 10.0),
            (1e12, 1e12, 1.0, 1.0),
        ];
        for (px, py, w, h) in cases {
            let c = Coordenadas::from_click(px, py, w, h);
            assert!((0.0..=100.0).contains(&c.x()), "x out of range for {px},{w}");
            assert!((0.0..=100.0).contains(&c.y()), "y out of range for {py},{h}");
        }
    }

    #[test]
    fn test_deserialization_clamps() {
        let c: Coordenadas = serde_json::from_str(r#"{"x": 120.5, "y": -3}"#).unwrap();
        assert_eq!(c, Coordenadas::new(100.0, 0.0));
        assert_eq!(c.css_position(), "left:100%;top:0%;");
    }

    #[test]
    fn test_imagem_config_normalization() {
        let cfg = ImagemConfig {
            categoria: CategoriaImagem::Cranio,
            vista: Vista::Posterior,
            lado: Lado::Feminino,
        }
        .normalized();
        assert_eq!(cfg.vista, Vista::Anterior);
        assert_eq!(cfg.lado, Lado::Direito);
        assert_eq!(cfg.image_path(), "/assets/anatomia/cranio_anterior_direito.svg");
    }

    #[test]
    fn test_marcacao_flattens_image_config() {
        let json = r#"{
            "_id": "m1", "vitima": "v1", "tipo": "cicatriz",
            "regiao": {"codigo": "TOR", "nome": "Tórax"},
            "coordenadas": {"x": 40, "y": 35},
            "categoria": "corpo_inteiro", "vista": "posterior", "lado": "feminino"
        }"#;
        let m: MarcacaoAnatomica = serde_json::from_str(json).unwrap();
        assert_eq!(m.imagem.vista, Vista::Posterior);
        assert_eq!(m.tamanho, Tamanho::Medio);
        assert_eq!(m.cor, "#e53935");
    }

    #[test]
    fn test_nova_marcacao_rejects_region_from_other_category() {
        let nova = NovaMarcacao {
            vitima: "v1".to_string(),
            tipo: "fratura".to_string(),
            regiao: Regiao {
                codigo: "MAN".to_string(),
                nome: "Mandíbula".to_string(),
            },
            descricao: String::new(),
            cor: default_cor(),
            tamanho: Tamanho::Pequeno,
            coordenadas: Coordenadas::new(10.0, 10.0),
            imagem: ImagemConfig::for_categoria(CategoriaImagem::Mao),
        };
        assert!(matches!(
            nova.validate(),
            Err(ValidationError::Invalid { field: "regiao", .. })
        ));
        let ok = NovaMarcacao {
            imagem: ImagemConfig::for_categoria(CategoriaImagem::Cranio),
            ..nova
        };
        assert!(ok.validate().is_ok());
    }
}
