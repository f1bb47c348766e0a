#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Specialties,
    Physicians,
}

impl Route {
    /// Unmatched paths redirect to the landing page.
    pub fn resolve(path: &str) -> Self {
        match path.trim().trim_matches('/') {
            "specialties" => Self::Specialties,
            "physicians" => Self::Physicians,
            _ => Self::Home,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Specialties => "/specialties",
            Self::Physicians => "/physicians",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Specialties => "Specialties",
            Self::Physicians => "Physicians",
        }
    }

    pub fn all() -> [Self; 3] {
        [Self::Home, Self::Specialties, Self::Physicians]
    }
}
