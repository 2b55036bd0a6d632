/// Enrollment request carrying a server uuid and what it enrolls as
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RegisterReq {
    #[prost(string, tag = "1")]
    pub uuid: ::prost::alloc::string::String,
    #[prost(enumeration = "register_req::Type", tag = "2")]
    pub r#type: i32,
}

pub mod register_req {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Type {
        Server = 0,
        State = 1,
    }

    impl Type {
        pub fn as_str_name(&self) -> &'static str {
            match self {
                Self::Server => "SERVER",
                Self::State => "STATE",
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct RegisterRes {
    #[prost(bool, tag = "1")]
    pub enrolled: bool,
}

/// Health report about `target_uuid`, filed by `reportee_uuid`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReportReq {
    #[prost(string, tag = "1")]
    pub target_uuid: ::prost::alloc::string::String,
    #[prost(enumeration = "report_req::State", tag = "2")]
    pub state: i32,
    #[prost(string, tag = "3")]
    pub reportee_uuid: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub reason: ::prost::alloc::string::String,
}

pub mod report_req {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum State {
        Up = 0,
        Down = 1,
        Maintenance = 2,
    }

    impl State {
        pub fn as_str_name(&self) -> &'static str {
            match self {
                Self::Up => "UP",
                Self::Down => "DOWN",
                Self::Maintenance => "MAINTENANCE",
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct ReportRes {}
