//! 측정 지점 정의.
//!
//! 아과치카(Aguachica) 시내의 관심 지점 8곳을 기본 측정 지점으로 제공합니다.
//! 수집기는 이 목록을 그대로 사용하거나 테스트용 커스텀 목록을 주입할 수 있습니다.

use serde::{Deserialize, Serialize};

/// 대기질 측정 지점.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// 지점 식별자 (예: "parque_central")
    pub id: String,
    /// 지점 이름
    pub name: String,
    /// 위도
    pub lat: f64,
    /// 경도
    pub lon: f64,
}

impl Location {
    /// 새 측정 지점을 생성합니다.
    pub fn new(id: impl Into<String>, name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lat,
            lon,
        }
    }
}

/// 기본 측정 지점 목록 (아과치카 관심 지점 8곳).
pub fn default_locations() -> Vec<Location> {
    vec![
        Location::new("aguachica_general", "Aguachica - Vista General", 8.312, -73.626),
        Location::new(
            "parque_central",
            "Parque Central",
            8.310675833008426,
            -73.62363665855918,
        ),
        Location::new(
            "universidad",
            "Universidad Popular del Cesar",
            8.314789098234467,
            -73.59638568793966,
        ),
        Location::new(
            "parque_morrocoy",
            "Parque Morrocoy",
            8.310373774726447,
            -73.61670782048647,
        ),
        Location::new(
            "patinodromo",
            "Patinódromo",
            8.297149888853758,
            -73.62335200184627,
        ),
        Location::new(
            "ciudadela_paz",
            "Ciudadela de la Paz",
            8.312099985681844,
            -73.63467832511535,
        ),
        Location::new("bosque", "Bosque", 8.312303609676293, -73.61448867800057),
        Location::new("estadio", "Estadio", 8.30159931733102, -73.622763654179),
    ]
}
