pub struct Health {
    pub ready: bool,
}

impl Health {
    pub fn readiness() -> Self {
        Self { ready: true }
    }
}
