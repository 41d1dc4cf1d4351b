pub mod course;
pub mod major;
pub mod plan;
pub mod student;

pub use course::{Course, Term};
pub use major::{GeneralEducationRequirement, Major, MajorRequirement, RequirementSpec};
pub use plan::{
    AcademicPlan, AddCourseRequest, AiRecommendations, CourseRecommendation, RenamePlanRequest,
    Semester,
};
pub use student::{NewStudentRequest, Preferences, Student, UpdatePreferencesRequest};
