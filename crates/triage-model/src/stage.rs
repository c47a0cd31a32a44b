//! Process stages and the staff that serve them.

use std::fmt;

use triage_core::ResourceId;

/// A step of the patient flow that queues for one staff resource.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Stage {
    Registration,
    Triage,
    OutpatientAssessment,
    EmergencyAssessment,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Registration,
        Stage::Triage,
        Stage::OutpatientAssessment,
        Stage::EmergencyAssessment,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Registration         => "registration",
            Stage::Triage               => "triage",
            Stage::OutpatientAssessment => "outpatient_assessment",
            Stage::EmergencyAssessment  => "emergency_assessment",
        }
    }

    /// Who serves this stage.
    pub fn staff(self) -> Staff {
        match self {
            Stage::Registration         => Staff::Receptionist,
            Stage::Triage               => Staff::Nurse,
            Stage::OutpatientAssessment => Staff::OutpatientDoctor,
            Stage::EmergencyAssessment  => Staff::EmergencyDoctor,
        }
    }

    /// Whether the patient leaves the clinic after this stage.
    pub fn is_final(self) -> bool {
        matches!(self, Stage::OutpatientAssessment | Stage::EmergencyAssessment)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A staff pool, modelled as one finite-capacity resource.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Staff {
    Receptionist,
    Nurse,
    OutpatientDoctor,
    EmergencyDoctor,
}

impl Staff {
    pub const ALL: [Staff; 4] = [
        Staff::Receptionist,
        Staff::Nurse,
        Staff::OutpatientDoctor,
        Staff::EmergencyDoctor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Staff::Receptionist     => "receptionist",
            Staff::Nurse            => "nurse",
            Staff::OutpatientDoctor => "outpatient_doctor",
            Staff::EmergencyDoctor  => "emergency_doctor",
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Staff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The resource id each staff pool was registered under in one run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StaffIds([ResourceId; 4]);

impl StaffIds {
    pub fn new(ids: [ResourceId; 4]) -> Self {
        StaffIds(ids)
    }

    #[inline]
    pub fn get(&self, staff: Staff) -> ResourceId {
        self.0[staff.index()]
    }

    /// Staff pools with their resource ids, in [`Staff::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Staff, ResourceId)> + '_ {
        Staff::ALL.into_iter().map(|s| (s, self.get(s)))
    }
}
