//! Service catalog
//!
//! Display metadata per service type. Unknown types resolve to a generic
//! entry named after the raw code.

use rescate_core::models::ServiceType;

/// Icon used for service types missing from the catalog
pub const FALLBACK_ICON: &str = "fas fa-medical-cross";

/// Description used for service types missing from the catalog
pub const FALLBACK_DESCRIPTION: &str = "Servicio médico";

/// Display metadata for a service type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub icon: &'static str,
    pub name: String,
    pub description: &'static str,
}

/// Describe a service type
pub fn describe(service_type: &ServiceType) -> ServiceDescriptor {
    let (icon, name, description) = match service_type {
        ServiceType::Urgencia => (
            "fas fa-ambulance",
            "Urgencias",
            "Atención de emergencias médicas con ambulancia",
        ),
        ServiceType::MedicoDomicilio => (
            "fas fa-user-md",
            "Médico a domicilio",
            "Consulta médica en su domicilio",
        ),
        ServiceType::TrasladoProgramado => (
            "fas fa-hospital",
            "Traslado programado",
            "Traslado asistido no urgente con cita previa",
        ),
        ServiceType::ZonaProtegida => (
            "fas fa-shield-alt",
            "Zona protegida",
            "Cobertura de emergencias en el área protegida",
        ),
        ServiceType::General => (
            "fas fa-heartbeat",
            "Servicios generales",
            "Bolsa de servicios compartida del plan",
        ),
        ServiceType::Other(code) => {
            return ServiceDescriptor {
                icon: FALLBACK_ICON,
                name: code.clone(),
                description: FALLBACK_DESCRIPTION,
            }
        }
    };

    ServiceDescriptor {
        icon,
        name: name.to_string(),
        description,
    }
}
