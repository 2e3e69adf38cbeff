//! Route table of the portal and the guard that decides, for a given
//! session, whether a route renders or where it redirects.

use std::fmt::Display;

use crate::auth::session::SessionState;
use crate::models::domain::user::{Role, User};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Root,
    Login,

    TeacherHome,
    TeacherClasses,
    TeacherClassChapters { class_id: String },
    TeacherAddChapter { class_id: String },
    TeacherQuizEditor { class_id: String, subject_id: String },
    TeacherQuizView { class_id: String, subject_id: String },
    TeacherClassStudents { class_id: String },
    TeacherInviteStudents { class_id: String },
    TeacherInsights,
    TeacherProfile,

    StudentHome,
    StudentClasses,
    StudentClassSubjects { class_id: String },
    StudentQuiz { subject_id: String },
    StudentProgress,
    StudentProfile,

    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    Public,
    Teacher,
    Student,
}

/// Outcome of the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render,
    Redirect(Route),
    /// Session still loading, or the user has no role yet.
    Pending,
}

impl Route {
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let id = |s: &str| s.to_string();

        match segments.as_slice() {
            [] => Self::Root,
            ["login"] => Self::Login,

            ["teacher"] => Self::TeacherHome,
            ["teacher", "classes"] => Self::TeacherClasses,
            ["teacher", "classes", c] => Self::TeacherClassChapters { class_id: id(c) },
            ["teacher", "classes", c, "add-chapter"] => Self::TeacherAddChapter { class_id: id(c) },
            ["teacher", "classes", c, "generated-questions", s] => Self::TeacherQuizEditor {
                class_id: id(c),
                subject_id: id(s),
            },
            ["teacher", "classes", c, "view-quiz", s] => Self::TeacherQuizView {
                class_id: id(c),
                subject_id: id(s),
            },
            ["teacher", "classes", c, "students"] => Self::TeacherClassStudents { class_id: id(c) },
            ["teacher", "classes", c, "invite"] => Self::TeacherInviteStudents { class_id: id(c) },
            ["teacher", "insights"] => Self::TeacherInsights,
            ["teacher", "profile"] => Self::TeacherProfile,

            ["student"] => Self::StudentHome,
            ["student", "classes"] => Self::StudentClasses,
            ["student", "classes", c] => Self::StudentClassSubjects { class_id: id(c) },
            ["student", "quiz", s] => Self::StudentQuiz { subject_id: id(s) },
            ["student", "rank"] => Self::StudentProgress,
            ["student", "profile"] => Self::StudentProfile,

            _ => Self::NotFound,
        }
    }

    pub fn to_path(&self) -> String {
        match self {
            Self::Root => "/".to_string(),
            Self::Login => "/login".to_string(),

            Self::TeacherHome => "/teacher".to_string(),
            Self::TeacherClasses => "/teacher/classes".to_string(),
            Self::TeacherClassChapters { class_id } => format!("/teacher/classes/{}", class_id),
            Self::TeacherAddChapter { class_id } => format!("/teacher/classes/{}/add-chapter", class_id),
            Self::TeacherQuizEditor { class_id, subject_id } => {
                format!("/teacher/classes/{}/generated-questions/{}", class_id, subject_id)
            }
            Self::TeacherQuizView { class_id, subject_id } => {
                format!("/teacher/classes/{}/view-quiz/{}", class_id, subject_id)
            }
            Self::TeacherClassStudents { class_id } => format!("/teacher/classes/{}/students", class_id),
            Self::TeacherInviteStudents { class_id } => format!("/teacher/classes/{}/invite", class_id),
            Self::TeacherInsights => "/teacher/insights".to_string(),
            Self::TeacherProfile => "/teacher/profile".to_string(),

            Self::StudentHome => "/student".to_string(),
            Self::StudentClasses => "/student/classes".to_string(),
            Self::StudentClassSubjects { class_id } => format!("/student/classes/{}", class_id),
            Self::StudentQuiz { subject_id } => format!("/student/quiz/{}", subject_id),
            Self::StudentProgress => "/student/rank".to_string(),
            Self::StudentProfile => "/student/profile".to_string(),

            Self::NotFound => "/404".to_string(),
        }
    }

    pub fn area(&self) -> Area {
        match self {
            Self::Root | Self::Login | Self::NotFound => Area::Public,
            Self::TeacherHome
            | Self::TeacherClasses
            | Self::TeacherClassChapters { .. }
            | Self::TeacherAddChapter { .. }
            | Self::TeacherQuizEditor { .. }
            | Self::TeacherQuizView { .. }
            | Self::TeacherClassStudents { .. }
            | Self::TeacherInviteStudents { .. }
            | Self::TeacherInsights
            | Self::TeacherProfile => Area::Teacher,
            Self::StudentHome
            | Self::StudentClasses
            | Self::StudentClassSubjects { .. }
            | Self::StudentQuiz { .. }
            | Self::StudentProgress
            | Self::StudentProfile => Area::Student,
        }
    }

    pub fn requires_auth(&self) -> bool {
        self.area() != Area::Public || matches!(self, Self::Root)
    }

    /// Home of a signed-in user; `None` while the role is unknown.
    pub fn home_for(user: &User) -> Option<Self> {
        match user.role {
            Role::Unknown => None,
            Role::Teacher => Some(Self::TeacherHome),
            _ => Some(Self::StudentHome),
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

pub fn guard(route: &Route, state: &SessionState) -> Navigation {
    let user = match state {
        SessionState::Loading => return Navigation::Pending,
        SessionState::Anonymous => {
            return if route.requires_auth() {
                Navigation::Redirect(Route::Login)
            } else {
                Navigation::Render
            };
        }
        SessionState::Authenticated(user) => user,
    };

    match route {
        Route::Root | Route::Login => match Route::home_for(user) {
            Some(home) => Navigation::Redirect(home),
            None => Navigation::Pending,
        },
        Route::NotFound => Navigation::Render,
        _ => {
            let allowed = match route.area() {
                Area::Teacher => user.role == Role::Teacher,
                Area::Student => user.role != Role::Teacher,
                Area::Public => true,
            };
            if allowed {
                Navigation::Render
            } else {
                match Route::home_for(user) {
                    Some(home) => Navigation::Redirect(home),
                    None => Navigation::Pending,
                }
            }
        }
    }
}
